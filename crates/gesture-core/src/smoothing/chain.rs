//! Sequential composition of smoothers.

use std::fmt;

use palmcursor_common::error::{PalmError, PalmResult};
use palmcursor_frame_model::frame::TimestampMs;
use palmcursor_frame_model::geometry::Point2D;

use super::{Estimate, Smoother};

/// Runs each stage on the previous stage's position.
///
/// The reported velocity and acceleration come from the last stage. The
/// prediction comes from the last stage that offers one, so a denoising
/// filter can feed a predictor.
pub struct SmootherChain {
    stages: Vec<Box<dyn Smoother>>,
}

impl SmootherChain {
    pub fn new(stages: Vec<Box<dyn Smoother>>) -> PalmResult<Self> {
        if stages.is_empty() {
            return Err(PalmError::config("smoother chain must have at least one stage"));
        }
        Ok(Self { stages })
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage names in application order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}

impl fmt::Debug for SmootherChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmootherChain")
            .field("stages", &self.stage_names())
            .finish()
    }
}

impl Smoother for SmootherChain {
    fn process(&mut self, sample: Point2D, timestamp_ms: TimestampMs) -> Estimate {
        let mut input = sample;
        let mut out = Estimate::at_rest(sample);
        let mut predicted = None;
        for stage in &mut self.stages {
            out = stage.process(input, timestamp_ms);
            predicted = out.predicted.or(predicted);
            input = out.position;
        }
        out.predicted = predicted;
        out
    }

    fn predict(&self, horizon_ms: f64) -> Option<Point2D> {
        self.stages.iter().rev().find_map(|s| s.predict(horizon_ms))
    }

    fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }

    fn name(&self) -> &'static str {
        "chain"
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::{
        DoubleExponentialConfig, DoubleExponentialPredictor, OneEuroConfig, OneEuroSmoother,
        PassthroughSmoother,
    };
    use super::*;

    #[test]
    fn test_empty_chain_is_rejected() {
        assert!(SmootherChain::new(vec![]).unwrap_err().is_config());
    }

    #[test]
    fn test_debug_lists_stages() {
        let chain = SmootherChain::new(vec![
            Box::new(PassthroughSmoother::new()),
            Box::new(OneEuroSmoother::new(OneEuroConfig::default()).unwrap()),
        ])
        .unwrap();
        assert_eq!(
            format!("{chain:?}"),
            format!("SmootherChain {{ stages: {:?} }}", chain.stage_names())
        );
    }

    #[test]
    fn test_single_stage_matches_stage() {
        let samples = jittery_samples();
        let mut alone = OneEuroSmoother::new(OneEuroConfig::default()).unwrap();
        let mut chain = SmootherChain::new(vec![Box::new(
            OneEuroSmoother::new(OneEuroConfig::default()).unwrap(),
        )])
        .unwrap();
        assert_eq!(run(&mut alone, &samples), run(&mut chain, &samples));
    }

    #[test]
    fn test_prediction_survives_later_stages() {
        let mut chain = SmootherChain::new(vec![
            Box::new(OneEuroSmoother::new(OneEuroConfig::default()).unwrap()),
            Box::new(
                DoubleExponentialPredictor::new(DoubleExponentialConfig::default()).unwrap(),
            ),
            Box::new(PassthroughSmoother::new()),
        ])
        .unwrap();
        assert_eq!(
            chain.stage_names(),
            vec!["one_euro", "double_exponential", "passthrough"]
        );

        let last = run(&mut chain, &linear_samples(20, 0.5)).pop().unwrap();
        assert!(last.predicted.is_some());
        assert_eq!(last.predicted, chain.predict(50.0));
    }
}
