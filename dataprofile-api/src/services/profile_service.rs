use crate::errors::ApiError;
use crate::services::ReportStore;
use actix_web::web;
use dataprofile_core::{
    orchestrator_from_config, AppConfig, DataFrame, PipelineOutcome, ReportOrchestrator,
    UploadedFile,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// One upload taken through the pipeline, with the stored report id when generation succeeded.
#[derive(Debug)]
pub struct ProfileRun {
    pub upload_name: String,
    pub outcome: PipelineOutcome,
    pub report_id: Option<Uuid>,
    pub preview: Option<DataFrame>,
}

impl ProfileRun {
    pub fn is_success(&self) -> bool {
        self.report_id.is_some()
    }
}

pub struct ProfileService {
    orchestrator: ReportOrchestrator,
    store: ReportStore,
    preview_rows: usize,
}

impl ProfileService {
    pub fn new(orchestrator: ReportOrchestrator, store: ReportStore, preview_rows: usize) -> Self {
        Self {
            orchestrator,
            store,
            preview_rows,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            orchestrator_from_config(config),
            ReportStore::new(config.ui.report_cache_capacity),
            config.ui.preview_rows,
        )
    }

    pub fn store(&self) -> &ReportStore {
        &self.store
    }

    /// Load, profile and store the report for `upload`. Blocks the calling thread.
    pub fn run(&self, upload: UploadedFile) -> ProfileRun {
        let outcome = self.orchestrator.process(&upload);
        let preview = outcome.table().map(|df| df.head(Some(self.preview_rows)));
        let report_id = outcome
            .generation()
            .and_then(|generation| generation.artifact())
            .map(|artifact| self.store.insert(artifact.clone()));

        if let Some(id) = report_id {
            info!("Stored report for {} as {}", upload.name, id);
        }

        ProfileRun {
            upload_name: upload.name,
            outcome,
            report_id,
            preview,
        }
    }

    /// Run the pipeline on the blocking pool. Log capture is scoped to the thread
    /// that profiles, so the whole run stays on one blocking thread.
    pub async fn run_blocking(
        self: Arc<Self>,
        upload: UploadedFile,
    ) -> Result<ProfileRun, ApiError> {
        Ok(web::block(move || self.run(upload)).await?)
    }
}
