use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid sales order: {0:?}")]
    InvalidSalesOrder(String),
    #[error("invalid consignment code: {0:?}")]
    InvalidConsignmentCode(String),
    #[error("invalid depot id: {0:?}")]
    InvalidDepotId(String),
    #[error("invalid origin id: {0:?}")]
    InvalidOriginId(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
