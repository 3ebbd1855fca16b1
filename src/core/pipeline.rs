use crate::core::export::{self, OutputFormat};
use crate::core::scraper::LeadScraper;
use crate::domain::model::{Lead, PlaceRecord, SearchRequest, TransformResult};
use crate::domain::ports::{Pipeline, Storage};
use crate::utils::error::Result;
use chrono::{DateTime, TimeZone};

/// CLI flow: details for one search, flattened to leads, written as files.
pub struct LeadPipeline<S: Storage> {
    scraper: LeadScraper,
    storage: S,
    request: SearchRequest,
    formats: Vec<OutputFormat>,
    basename: Option<String>,
}

impl<S: Storage> LeadPipeline<S> {
    pub fn new(
        scraper: LeadScraper,
        storage: S,
        request: SearchRequest,
        formats: Vec<OutputFormat>,
    ) -> Self {
        Self {
            scraper,
            storage,
            request,
            formats,
            basename: None,
        }
    }

    /// Fixed output name instead of the timestamped default.
    pub fn with_basename(mut self, basename: impl Into<String>) -> Self {
        self.basename = Some(basename.into());
        self
    }

    /// Output name for files written at `now`.
    pub fn output_basename<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        match &self.basename {
            Some(basename) => basename.clone(),
            None => export::build_output_basename(&self.request.query, &self.request.location, now),
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for LeadPipeline<S> {
    async fn extract(&self) -> Result<Vec<PlaceRecord>> {
        Ok(self.scraper.collect_place_details(&self.request).await)
    }

    async fn transform(&self, data: Vec<PlaceRecord>) -> Result<TransformResult> {
        let leads = data.iter().map(Lead::from_record).collect();
        Ok(TransformResult { leads })
    }

    async fn load(&self, result: TransformResult) -> Result<Vec<String>> {
        // Stamped after the scrape so the name reflects when the data was collected.
        let basename = self.output_basename(&chrono::Local::now());
        let mut written = Vec::with_capacity(self.formats.len());
        for format in &self.formats {
            let bytes = export::render(&result.leads, *format)?;
            let file_name = format!("{}.{}", basename, format.extension());
            let path = self.storage.write_file(&file_name, &bytes).await?;
            tracing::info!("{} written: {}", format.extension().to_uppercase(), path);
            written.push(path);
        }
        Ok(written)
    }
}
