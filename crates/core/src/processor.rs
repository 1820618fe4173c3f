//! One processing pass: discovery, extraction, validation, generation.
//!
//! A pass is synchronous and single-threaded; it runs over one batch of
//! declarations to completion or hard abort. The change tracker carries
//! state between passes under the host's serial-invocation guarantee.

use crate::cache::ChangeTracker;
use crate::config::ProcessorOptions;
use crate::diag::Diagnostics;
use crate::error::{ProcessorError, Result};
use crate::extract::{ExtractionStats, Extractor};
use crate::generate::RegistryGenerator;
use crate::validate::Validator;
use std::collections::HashMap;
use std::time::Instant;
use wireup_api::models::Declaration;
use wireup_api::{ArtifactSink, SymbolSource};

/// Declaration counts above which a pass warns about its batch size.
const LARGE_BATCH_THRESHOLD: usize = 1000;

#[derive(Debug, Default)]
pub struct PassOutcome {
    /// Declarations the symbol source could not resolve yet. Empty means
    /// the pass fully processed its input and the artifact was generated or
    /// deliberately skipped for empty input.
    pub deferred: Vec<Declaration>,
    pub stats: PassStats,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PassStats {
    pub extraction: ExtractionStats,
    pub deferred: usize,
    pub warnings: usize,
    pub errors: usize,
    pub artifact_generated: bool,
}

pub struct RegistryProcessor {
    options: ProcessorOptions,
    tracker: ChangeTracker,
}

impl RegistryProcessor {
    pub fn new(options: ProcessorOptions) -> Self {
        crate::logging::ensure_initialized(options.log_level);
        Self {
            options,
            tracker: ChangeTracker::new(),
        }
    }

    /// Construct from the host's flat string-keyed option map.
    pub fn from_options_map(options: &HashMap<String, String>) -> Self {
        Self::new(ProcessorOptions::from_map(options))
    }

    pub fn options(&self) -> &ProcessorOptions {
        &self.options
    }

    /// Run one full pass over the symbol source's declarations.
    ///
    /// A failing symbol source is logged and treated as "nothing to do this
    /// pass" rather than crashing the host build; validation and generation
    /// failures are hard errors.
    pub fn process(
        &mut self,
        source: &dyn SymbolSource,
        sink: &mut dyn ArtifactSink,
    ) -> Result<PassOutcome> {
        let started = Instant::now();
        let diag = Diagnostics::new(self.options.log_level);
        diag.info("========== registry pass started ==========");

        let provider_decls = match source.provider_declarations() {
            Ok(decls) => decls,
            Err(err) => {
                diag.error(&format!("failed to query provider declarations: {err}"));
                return Ok(self.outcome(Vec::new(), ExtractionStats::default(), false, &diag));
            }
        };
        let module_decls = match source.module_declarations() {
            Ok(decls) => decls,
            Err(err) => {
                diag.error(&format!("failed to query module declarations: {err}"));
                return Ok(self.outcome(Vec::new(), ExtractionStats::default(), false, &diag));
            }
        };

        diag.info(&format!(
            "discovered {} provider and {} module declaration(s)",
            provider_decls.len(),
            module_decls.len()
        ));

        if provider_decls.is_empty() && module_decls.is_empty() {
            diag.info("no annotated declarations found; nothing to do");
            return Ok(self.outcome(Vec::new(), ExtractionStats::default(), false, &diag));
        }
        if provider_decls.len() > LARGE_BATCH_THRESHOLD
            || module_decls.len() > LARGE_BATCH_THRESHOLD
        {
            diag.warn(&format!(
                "large declaration batch (providers: {}, modules: {}); this pass may take a while",
                provider_decls.len(),
                module_decls.len()
            ));
        }

        let extractor = Extractor::new(&self.options, &diag);
        let extraction = extractor.run(provider_decls, module_decls, &mut self.tracker);

        diag.statistics(&[
            ("providers processed", extraction.stats.processed_providers.to_string()),
            ("providers skipped", extraction.stats.skipped_providers.to_string()),
            ("providers errored", extraction.stats.errored_providers.to_string()),
            ("modules processed", extraction.stats.processed_modules.to_string()),
            ("modules skipped", extraction.stats.skipped_modules.to_string()),
            ("modules errored", extraction.stats.errored_modules.to_string()),
            ("deferred declarations", extraction.deferred.len().to_string()),
            ("incremental", self.options.enable_incremental.to_string()),
        ]);

        if !extraction.deferred.is_empty() {
            diag.info(&format!(
                "{} declaration(s) not yet resolvable; deferring registry generation",
                extraction.deferred.len()
            ));
            let stats = extraction.stats;
            return Ok(self.outcome(extraction.deferred, stats, false, &diag));
        }

        if extraction.providers.is_empty() && extraction.modules.is_empty() {
            diag.warn("no providers or modules were extracted; skipping registry generation");
            return Ok(self.outcome(Vec::new(), extraction.stats, false, &diag));
        }

        let validation_started = Instant::now();
        Validator::new(&self.options, &diag).validate(&extraction.providers, &extraction.modules)?;
        if self.options.show_performance_stats {
            diag.performance("validation", validation_started.elapsed());
        }

        let generation_started = Instant::now();
        let generator = RegistryGenerator::new(&self.options, &diag);
        let artifact = generator.generate(extraction.providers, extraction.modules)?;
        if self.options.show_performance_stats {
            diag.performance("generation", generation_started.elapsed());
        }

        sink.write(&artifact).map_err(|err| {
            diag.error(&format!("failed to persist registry artifact: {err}"));
            ProcessorError::generation_caused_by(
                "failed to persist registry artifact",
                ProcessorError::Sink(err.to_string()),
            )
        })?;

        if self.options.show_performance_stats {
            diag.performance("pass", started.elapsed());
        }
        diag.info("========== registry pass finished ==========");

        let stats = extraction.stats;
        Ok(self.outcome(Vec::new(), stats, true, &diag))
    }

    fn outcome(
        &self,
        deferred: Vec<Declaration>,
        extraction: ExtractionStats,
        artifact_generated: bool,
        diag: &Diagnostics,
    ) -> PassOutcome {
        PassOutcome {
            stats: PassStats {
                extraction,
                deferred: deferred.len(),
                warnings: diag.warning_count(),
                errors: diag.error_count(),
                artifact_generated,
            },
            deferred,
        }
    }
}
