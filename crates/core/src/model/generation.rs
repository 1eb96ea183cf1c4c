use crate::refresh;

/// Extra candidates requested beyond the desired count to absorb filtering losses.
pub const OVER_REQUEST: usize = 3;

/// Upper bound on candidates requested from the generator in a single call.
pub const MAX_CANDIDATES: usize = 8;

/// Parameters for one round of question generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub topic: String,
    pub desired_count: usize,
    pub temperature: f64,
    pub is_refresh: bool,
    pub refresh_sequence_number: u32,
}

impl GenerationRequest {
    /// A first-time request at the base temperature.
    ///
    /// `desired_count` is raised to 1 if zero.
    #[must_use]
    pub fn new(topic: impl Into<String>, desired_count: usize) -> Self {
        Self {
            topic: topic.into(),
            desired_count: desired_count.max(1),
            temperature: refresh::BASE_TEMPERATURE,
            is_refresh: false,
            refresh_sequence_number: 0,
        }
    }

    /// A refresh request; temperature escalates with `refresh_count`.
    ///
    /// A refresh count of zero is treated as a first-time request.
    #[must_use]
    pub fn refresh(topic: impl Into<String>, desired_count: usize, refresh_count: u32) -> Self {
        let mut request = Self::new(topic, desired_count);
        if refresh_count > 0 {
            request.temperature = refresh::temperature_for(refresh_count);
            request.is_refresh = true;
            request.refresh_sequence_number = refresh_count;
        }
        request
    }

    /// Number of raw candidates to ask the generator for.
    #[must_use]
    pub fn candidate_count(&self) -> usize {
        self.desired_count
            .saturating_add(OVER_REQUEST)
            .min(MAX_CANDIDATES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_requests_up_to_cap() {
        assert_eq!(GenerationRequest::new("Math", 1).candidate_count(), 4);
        assert_eq!(GenerationRequest::new("Math", 5).candidate_count(), 8);
        assert_eq!(GenerationRequest::new("Math", 10).candidate_count(), 8);
        assert_eq!(GenerationRequest::new("Math", usize::MAX).candidate_count(), 8);
    }

    #[test]
    fn zero_count_becomes_one() {
        assert_eq!(GenerationRequest::new("Math", 0).desired_count, 1);
    }

    #[test]
    fn zero_refresh_count_is_not_a_refresh() {
        let req = GenerationRequest::refresh("Math", 5, 0);
        assert!(!req.is_refresh);
        assert!((req.temperature - 0.7).abs() < 1e-9);
    }

    #[test]
    fn refresh_raises_temperature() {
        let req = GenerationRequest::refresh("Math", 5, 2);
        assert!(req.is_refresh);
        assert_eq!(req.refresh_sequence_number, 2);
        assert!((req.temperature - 0.9).abs() < 1e-9);
    }
}
