//! Pipeline registration
//!
//! Installs the JSON exporters into SDK tracer, logger and meter providers.
//! Customizers run once, in ascending [`PipelineCustomizer::order`], when
//! [`TelemetryPipelineBuilder::install`] is called.

use opentelemetry::global;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::logs::{LoggerProviderBuilder, SdkLoggerProvider};
use opentelemetry_sdk::metrics::{MeterProviderBuilder, PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::trace::{SdkTracerProvider, TracerProviderBuilder};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::ExporterError;
use crate::export::exporter::{JsonLogExporter, JsonMetricExporter, JsonSpanExporter};

/// Registration order of [`JsonExportCustomizer`]
pub const JSON_EXPORT_CUSTOMIZER_ORDER: i32 = 1000;

/// Hook that adjusts provider builders before the pipeline is built
///
/// All methods default to leaving the builder untouched.
pub trait PipelineCustomizer: Send + Sync {
    /// Relative position among customizers; lower runs first
    fn order(&self) -> i32 {
        0
    }

    fn customize_tracer_provider(
        &self,
        builder: TracerProviderBuilder,
    ) -> Result<TracerProviderBuilder, ExporterError> {
        Ok(builder)
    }

    fn customize_logger_provider(
        &self,
        builder: LoggerProviderBuilder,
    ) -> Result<LoggerProviderBuilder, ExporterError> {
        Ok(builder)
    }

    fn customize_meter_provider(
        &self,
        builder: MeterProviderBuilder,
    ) -> Result<MeterProviderBuilder, ExporterError> {
        Ok(builder)
    }
}

/// Named factory for the JSON exporters
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporterProvider;

impl JsonExporterProvider {
    /// Name the exporters are selected by
    pub const NAME: &'static str = "customjson";

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    pub fn create_span_exporter(&self, config: &Config) -> Result<JsonSpanExporter, ExporterError> {
        JsonSpanExporter::new(config)
    }

    pub fn create_log_exporter(&self, config: &Config) -> Result<JsonLogExporter, ExporterError> {
        JsonLogExporter::new(config)
    }

    pub fn create_metric_exporter(
        &self,
        config: &Config,
    ) -> Result<JsonMetricExporter, ExporterError> {
        JsonMetricExporter::new(config)
    }
}

/// Customizer registering all three JSON exporters
///
/// Spans and logs go through simple (synchronous) processors; metrics through
/// a periodic reader running at the configured metric interval.
#[derive(Debug, Clone)]
pub struct JsonExportCustomizer {
    config: Config,
    provider: JsonExporterProvider,
}

impl JsonExportCustomizer {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            provider: JsonExporterProvider,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl PipelineCustomizer for JsonExportCustomizer {
    fn order(&self) -> i32 {
        JSON_EXPORT_CUSTOMIZER_ORDER
    }

    fn customize_tracer_provider(
        &self,
        builder: TracerProviderBuilder,
    ) -> Result<TracerProviderBuilder, ExporterError> {
        let exporter = self.provider.create_span_exporter(&self.config)?;
        Ok(builder.with_simple_exporter(exporter))
    }

    fn customize_logger_provider(
        &self,
        builder: LoggerProviderBuilder,
    ) -> Result<LoggerProviderBuilder, ExporterError> {
        let exporter = self.provider.create_log_exporter(&self.config)?;
        Ok(builder.with_simple_exporter(exporter))
    }

    fn customize_meter_provider(
        &self,
        builder: MeterProviderBuilder,
    ) -> Result<MeterProviderBuilder, ExporterError> {
        let exporter = self.provider.create_metric_exporter(&self.config)?;
        let reader = PeriodicReader::builder(exporter)
            .with_interval(self.config.metric_interval())
            .build();
        debug!(
            interval_minutes = self.config.metric_interval_minutes,
            "Registered periodic metric reader"
        );
        Ok(builder.with_reader(reader))
    }
}

/// Builder for [`TelemetryPipeline`]
#[derive(Default)]
pub struct TelemetryPipelineBuilder {
    resource: Option<Resource>,
    customizers: Vec<Box<dyn PipelineCustomizer>>,
    install_global: bool,
}

impl TelemetryPipelineBuilder {
    /// Resource attached to every provider
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Add a customizer
    pub fn with_customizer(mut self, customizer: impl PipelineCustomizer + 'static) -> Self {
        self.customizers.push(Box::new(customizer));
        self
    }

    /// Shorthand for adding a [`JsonExportCustomizer`]
    pub fn with_json_exporters(self, config: Config) -> Self {
        self.with_customizer(JsonExportCustomizer::new(config))
    }

    /// Also register the tracer and meter providers as process globals
    pub fn install_global(mut self, install: bool) -> Self {
        self.install_global = install;
        self
    }

    /// Apply every customizer once and build the providers
    pub fn install(mut self) -> Result<TelemetryPipeline, ExporterError> {
        self.customizers.sort_by_key(|c| c.order());

        let mut tracer_builder = SdkTracerProvider::builder();
        let mut logger_builder = SdkLoggerProvider::builder();
        let mut meter_builder = SdkMeterProvider::builder();

        if let Some(resource) = self.resource {
            tracer_builder = tracer_builder.with_resource(resource.clone());
            logger_builder = logger_builder.with_resource(resource.clone());
            meter_builder = meter_builder.with_resource(resource);
        }

        for customizer in &self.customizers {
            debug!(order = customizer.order(), "Applying pipeline customizer");
            tracer_builder = customizer.customize_tracer_provider(tracer_builder)?;
            logger_builder = customizer.customize_logger_provider(logger_builder)?;
            meter_builder = customizer.customize_meter_provider(meter_builder)?;
        }

        let tracer_provider = tracer_builder.build();
        let logger_provider = logger_builder.build();
        let meter_provider = meter_builder.build();

        if self.install_global {
            global::set_tracer_provider(tracer_provider.clone());
            global::set_meter_provider(meter_provider.clone());
        }

        info!(
            customizers = self.customizers.len(),
            global = self.install_global,
            "Telemetry pipeline installed"
        );

        Ok(TelemetryPipeline {
            tracer_provider,
            logger_provider,
            meter_provider,
            shut_down: false,
        })
    }
}

/// Providers built by the pipeline
///
/// Dropping the pipeline shuts the providers down if [`shutdown`](Self::shutdown)
/// was not called.
pub struct TelemetryPipeline {
    tracer_provider: SdkTracerProvider,
    logger_provider: SdkLoggerProvider,
    meter_provider: SdkMeterProvider,
    shut_down: bool,
}

impl std::fmt::Debug for TelemetryPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryPipeline")
            .field("shut_down", &self.shut_down)
            .finish_non_exhaustive()
    }
}

impl TelemetryPipeline {
    pub fn builder() -> TelemetryPipelineBuilder {
        TelemetryPipelineBuilder::default()
    }

    pub fn tracer_provider(&self) -> &SdkTracerProvider {
        &self.tracer_provider
    }

    pub fn logger_provider(&self) -> &SdkLoggerProvider {
        &self.logger_provider
    }

    pub fn meter_provider(&self) -> &SdkMeterProvider {
        &self.meter_provider
    }

    /// Push everything the providers hold to the exporters
    pub fn force_flush(&self) -> Result<(), ExporterError> {
        self.tracer_provider.force_flush()?;
        self.logger_provider.force_flush()?;
        self.meter_provider.force_flush()?;
        Ok(())
    }

    /// Flush and shut down all providers; later calls are no-ops
    ///
    /// Every provider is shut down even if an earlier one fails; the first
    /// failure is returned.
    pub fn shutdown(&mut self) -> Result<(), ExporterError> {
        if self.shut_down {
            return Ok(());
        }
        self.shut_down = true;

        let results = [
            ("tracer", self.tracer_provider.shutdown()),
            ("logger", self.logger_provider.shutdown()),
            ("meter", self.meter_provider.shutdown()),
        ];

        let mut first_error = None;
        for (provider, result) in results {
            if let Err(e) = result {
                warn!(provider = provider, error = %e, "Provider shutdown failed");
                first_error.get_or_insert(e);
            }
        }

        info!("Telemetry pipeline shut down");
        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

impl Drop for TelemetryPipeline {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!(error = %e, "Telemetry pipeline shutdown on drop failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Recording {
        order: i32,
        calls: Arc<Mutex<Vec<i32>>>,
    }

    impl PipelineCustomizer for Recording {
        fn order(&self) -> i32 {
            self.order
        }

        fn customize_tracer_provider(
            &self,
            builder: TracerProviderBuilder,
        ) -> Result<TracerProviderBuilder, ExporterError> {
            self.calls.lock().unwrap().push(self.order);
            Ok(builder)
        }
    }

    #[test]
    fn test_customizers_applied_once_in_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = TelemetryPipeline::builder()
            .with_customizer(Recording {
                order: 2000,
                calls: calls.clone(),
            })
            .with_customizer(Recording {
                order: -5,
                calls: calls.clone(),
            })
            .with_customizer(Recording {
                order: JSON_EXPORT_CUSTOMIZER_ORDER,
                calls: calls.clone(),
            })
            .install()
            .unwrap();

        assert_eq!(*calls.lock().unwrap(), vec![-5, 1000, 2000]);
        let _ = pipeline.shutdown();
        assert!(pipeline.shutdown().is_ok(), "Second shutdown is a no-op");
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(JsonExporterProvider.name(), "customjson");
    }
}
