use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    name: String,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            name: "etl".to_string(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub async fn run(&self) -> Result<P::Report> {
        let started = Instant::now();
        tracing::info!("Starting {}", self.name);

        tracing::debug!("Extracting data...");
        let raw = self.pipeline.extract().await?;

        tracing::debug!("Transforming data...");
        let transformed = self.pipeline.transform(raw).await?;

        tracing::debug!("Loading data...");
        let report = self.pipeline.load(transformed).await?;

        tracing::info!("{} finished in {:?}: {}", self.name, started.elapsed(), report);
        Ok(report)
    }
}
