use crate::chart::RadarChart;
use crate::error::ViewError;
use crate::model::RecommendationResponse;

/// A rendered chart. Each presentation gets a fresh generation number.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartInstance {
    pub generation: u64,
    pub chart: RadarChart,
}

/// Owns the one live radar chart of a view.
///
/// The previous instance is released before a new one is stored, so at most
/// one chart is ever live.
#[derive(Debug, Default)]
pub struct RadarView {
    current: Option<ChartInstance>,
    generation: u64,
}

impl RadarView {
    pub const fn new() -> Self {
        Self {
            current: None,
            generation: 0,
        }
    }

    /// Replaces the live chart with one built from `response`.
    ///
    /// The chart is built first; on error the previous chart stays live.
    pub fn present(
        &mut self,
        response: &RecommendationResponse,
    ) -> Result<&ChartInstance, ViewError> {
        let chart = RadarChart::from_response(response)?;
        self.release();
        self.generation += 1;
        log::debug!(
            "presenting chart {} with {} axes",
            self.generation,
            chart.labels().len()
        );
        Ok(self.current.insert(ChartInstance {
            generation: self.generation,
            chart,
        }))
    }

    /// Destroys the live chart, if any, and hands it back.
    pub fn release(&mut self) -> Option<ChartInstance> {
        let released = self.current.take();
        if let Some(instance) = &released {
            log::debug!("destroyed chart {}", instance.generation);
        }
        released
    }

    pub const fn current(&self) -> Option<&ChartInstance> {
        self.current.as_ref()
    }

    pub const fn live_instances(&self) -> usize {
        if self.current.is_some() {
            1
        } else {
            0
        }
    }
}
