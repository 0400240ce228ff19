//! Debounced auto-submit for keyboard-wedge scanners.

use std::time::{Duration, Instant};

use drm_model::{ConsignmentCode, Manifest};

use crate::scan::MIN_BARCODE_LENGTH;

/// Pause after the last keystroke before a partial value is submitted.
pub const AUTOSCAN_DELAY: Duration = Duration::from_millis(120);

/// What the input handler should do with the current field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputDecision {
    /// Empty or still too short.
    Wait,
    Submit(String),
    /// Submit the value at the deadline unless more input arrives.
    Scheduled(Instant),
}

#[derive(Debug, Clone)]
struct Pending {
    value: String,
    deadline: Instant,
}

#[derive(Debug, Clone)]
pub struct AutoScanGate {
    min_length: usize,
    delay: Duration,
    pending: Option<Pending>,
}

impl Default for AutoScanGate {
    fn default() -> Self {
        Self::new(MIN_BARCODE_LENGTH, AUTOSCAN_DELAY)
    }
}

impl AutoScanGate {
    pub fn new(min_length: usize, delay: Duration) -> Self {
        Self {
            min_length,
            delay,
            pending: None,
        }
    }

    /// React to the field changing to `raw`. Any pending deadline is cancelled.
    pub fn on_input(&mut self, raw: &str, now: Instant, manifest: &Manifest) -> InputDecision {
        self.pending = None;
        let value = raw.trim().to_uppercase();
        let length = value.chars().count();
        if value.is_empty() || length < self.min_length {
            return InputDecision::Wait;
        }
        if length == self.min_length || is_known_code(manifest, &value) {
            return InputDecision::Submit(value);
        }
        let deadline = now + self.delay;
        self.pending = Some(Pending { value, deadline });
        InputDecision::Scheduled(deadline)
    }

    /// Take the pending value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        if self.pending.as_ref()?.deadline > now {
            return None;
        }
        self.pending.take().map(|pending| pending.value)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

fn is_known_code(manifest: &Manifest, value: &str) -> bool {
    let Ok(code) = ConsignmentCode::new(value) else {
        return false;
    };
    code.candidate_sales_order()
        .is_some_and(|so| manifest.is_expected(&so, &code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use drm_model::SalesOrder;

    fn manifest() -> Manifest {
        let so = SalesOrder::new("SO123456789").unwrap();
        let mut manifest = Manifest::default();
        manifest
            .generated
            .insert(so.clone(), vec![ConsignmentCode::for_sequence(&so, 1)]);
        manifest
    }

    #[test]
    fn short_input_waits() {
        let mut gate = AutoScanGate::default();
        let now = Instant::now();
        assert_eq!(gate.on_input("", now, &manifest()), InputDecision::Wait);
        assert_eq!(gate.on_input("SO12", now, &manifest()), InputDecision::Wait);
    }

    #[test]
    fn exact_minimum_and_known_codes_submit_immediately() {
        let mut gate = AutoScanGate::default();
        let now = Instant::now();
        assert_eq!(
            gate.on_input("so123456789", now, &manifest()),
            InputDecision::Submit("SO123456789".into())
        );
        assert_eq!(
            gate.on_input("SO123456789001", now, &manifest()),
            InputDecision::Submit("SO123456789001".into())
        );
    }

    #[test]
    fn new_input_cancels_pending_deadline() {
        let mut gate = AutoScanGate::default();
        let now = Instant::now();
        assert!(matches!(
            gate.on_input("SO1234567890", now, &manifest()),
            InputDecision::Scheduled(_)
        ));
        assert_eq!(gate.on_input("", now, &manifest()), InputDecision::Wait);
        assert_eq!(gate.poll(now + AUTOSCAN_DELAY * 2), None);
    }

    #[test]
    fn poll_fires_once_after_deadline() {
        let mut gate = AutoScanGate::default();
        let now = Instant::now();
        gate.on_input("SO1234567890", now, &manifest());
        assert_eq!(gate.poll(now), None);
        assert_eq!(
            gate.poll(now + AUTOSCAN_DELAY),
            Some("SO1234567890".to_string())
        );
        assert_eq!(gate.poll(now + AUTOSCAN_DELAY), None);
    }
}
