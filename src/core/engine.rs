use crate::domain::ports::Pipeline;
use crate::utils::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub lead_count: usize,
    pub output_paths: Vec<String>,
}

pub struct LeadEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> LeadEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::debug!("Extracting place details...");
        let records = self.pipeline.extract().await?;
        tracing::debug!("Extracted {} place records", records.len());

        let result = self.pipeline.transform(records).await?;
        let lead_count = result.leads.len();
        if lead_count == 0 {
            tracing::info!("No leads to write");
            return Ok(RunSummary::default());
        }

        tracing::debug!("Writing {} leads...", lead_count);
        let output_paths = self.pipeline.load(result).await?;

        Ok(RunSummary {
            lead_count,
            output_paths,
        })
    }
}
