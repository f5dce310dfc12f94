//! Scheduled control values

/// A single automation event on the engine timeline (times in seconds)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Automation {
    /// Jump to `value` at `time`.
    Set { time: f64, value: f32 },
    /// Ramp linearly from the previous event to `value`, arriving at `time`.
    Linear { time: f64, value: f32 },
    /// Ramp exponentially from the previous event to `value`, arriving at `time`.
    Exponential { time: f64, value: f32 },
}

impl Automation {
    pub fn time(&self) -> f64 {
        match *self {
            Automation::Set { time, .. }
            | Automation::Linear { time, .. }
            | Automation::Exponential { time, .. } => time,
        }
    }

    pub fn value(&self) -> f32 {
        match *self {
            Automation::Set { value, .. }
            | Automation::Linear { value, .. }
            | Automation::Exponential { value, .. } => value,
        }
    }

    fn is_ramp(&self) -> bool {
        !matches!(self, Automation::Set { .. })
    }
}

/// A control value whose trajectory is fixed ahead of time by automation events.
///
/// Before the first event the param reports its default value; after the last
/// event it holds that event's value. A ramp starts at the previous event (or at
/// time zero with the default value when there is none).
#[derive(Debug, Clone)]
pub struct AutomationParam {
    default_value: f32,
    events: Vec<Automation>,
}

impl AutomationParam {
    pub fn new(default_value: f32) -> Self {
        Self {
            default_value,
            events: Vec::new(),
        }
    }

    pub fn set_value_at_time(&mut self, value: f32, time: f64) -> &mut Self {
        self.insert(Automation::Set { time, value })
    }

    pub fn linear_ramp_to_value_at_time(&mut self, value: f32, time: f64) -> &mut Self {
        self.insert(Automation::Linear { time, value })
    }

    pub fn exponential_ramp_to_value_at_time(&mut self, value: f32, time: f64) -> &mut Self {
        self.insert(Automation::Exponential { time, value })
    }

    pub fn events(&self) -> &[Automation] {
        &self.events
    }

    fn insert(&mut self, event: Automation) -> &mut Self {
        // Events at equal times keep insertion order.
        let pos = self
            .events
            .iter()
            .position(|e| e.time() > event.time())
            .unwrap_or(self.events.len());
        self.events.insert(pos, event);
        self
    }

    /// Value of the parameter at engine time `t`.
    pub fn value_at(&self, t: f64) -> f32 {
        let next_index = self
            .events
            .iter()
            .position(|e| e.time() > t)
            .unwrap_or(self.events.len());

        let (prev_time, prev_value) = match next_index.checked_sub(1) {
            Some(i) => (self.events[i].time(), self.events[i].value()),
            None => (0.0, self.default_value),
        };

        let Some(next) = self.events.get(next_index) else {
            return prev_value;
        };
        if !next.is_ramp() {
            return prev_value;
        }

        let span = next.time() - prev_time;
        if span <= 0.0 {
            return next.value();
        }
        let progress = ((t - prev_time) / span).clamp(0.0, 1.0);

        match *next {
            Automation::Linear { value, .. } => {
                prev_value + (value - prev_value) * progress as f32
            }
            Automation::Exponential { value, .. } => {
                // Undefined across zero or a sign change; hold the start value.
                if prev_value * value <= 0.0 {
                    prev_value
                } else {
                    let ratio = (value / prev_value) as f64;
                    (prev_value as f64 * ratio.powf(progress)) as f32
                }
            }
            Automation::Set { .. } => prev_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_before_events() {
        let mut param = AutomationParam::new(0.7);
        param.set_value_at_time(0.2, 1.0);
        assert_eq!(param.value_at(0.5), 0.7);
        assert_eq!(param.value_at(1.0), 0.2);
        assert_eq!(param.value_at(9.0), 0.2);
    }

    #[test]
    fn test_linear_ramp_from_previous_event() {
        let mut param = AutomationParam::new(1.0);
        param
            .set_value_at_time(0.0, 2.0)
            .linear_ramp_to_value_at_time(1.0, 2.1);

        assert_eq!(param.value_at(2.0), 0.0);
        assert!((param.value_at(2.05) - 0.5).abs() < 1e-4);
        assert_eq!(param.value_at(2.1), 1.0);
    }

    #[test]
    fn test_exponential_ramp_is_geometric() {
        let mut param = AutomationParam::new(0.0);
        param
            .set_value_at_time(1.0, 0.0)
            .exponential_ramp_to_value_at_time(0.01, 2.0);

        // Halfway through a 1.0 -> 0.01 ramp sits at the geometric mean.
        assert!((param.value_at(1.0) - 0.1).abs() < 1e-5);
        assert!((param.value_at(2.0) - 0.01).abs() < 1e-6);
        assert!((param.value_at(5.0) - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_exponential_ramp_from_zero_holds() {
        let mut param = AutomationParam::new(0.0);
        param.exponential_ramp_to_value_at_time(1.0, 1.0);
        assert_eq!(param.value_at(0.5), 0.0);
        assert_eq!(param.value_at(1.0), 1.0);
    }

    #[test]
    fn test_events_are_kept_in_time_order() {
        let mut param = AutomationParam::new(0.0);
        param.set_value_at_time(3.0, 3.0);
        param.set_value_at_time(1.0, 1.0);
        let times: Vec<f64> = param.events().iter().map(|e| e.time()).collect();
        assert_eq!(times, vec![1.0, 3.0]);
    }
}
