mod load;
mod save;

pub use load::{load_cache, read_cache};
pub use save::{save_cache, save_cache_async};
