use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::adapters::{EnvVarsAdapter, FFmpegAdapter, HcommandHost, TomlConfigAdapter};
use crate::app::batch_writer::BatchWriter;
use crate::config::{Defaults, Settings, StaticOverrides};
use crate::error::MplayBatchResult;
use crate::ports::{EncoderPort, HostPort, OverrideSource};
use crate::utils::PlatformProfile;

/// Command port MPlay listens on when none is given
pub const DEFAULT_HOST_PORT: u16 = 48626;

/// How the default container reaches the outside world
#[derive(Debug, Clone, Default)]
pub struct ContainerOptions {
    /// Port opened in MPlay with `openport`
    pub port: Option<u16>,
    /// `hcommand` executable to use instead of the one on the search path
    pub hcommand: Option<String>,
    /// TOML file with setting overrides
    pub config_file: Option<PathBuf>,
    /// Overrides given on the command line; they win over every other layer
    pub overrides: StaticOverrides,
}

pub trait AppContainer: Send + Sync {
    fn host(&self) -> Arc<dyn HostPort>;
    fn encoder(&self) -> Arc<dyn EncoderPort>;
    fn profile(&self) -> &PlatformProfile;

    /// Resolve the settings for this run from every override layer
    fn resolve_settings(&self) -> MplayBatchResult<Arc<Settings>>;

    /// Writer for the current document, allocating its output directory
    fn batch_writer(
        &self,
        settings: Arc<Settings>,
        wants_video: bool,
        keep_source: bool,
    ) -> MplayBatchResult<BatchWriter> {
        BatchWriter::new(settings, self.host(), self.encoder(), wants_video, keep_source)
    }
}

pub struct DefaultAppContainer {
    host: Arc<dyn HostPort>,
    encoder: Arc<dyn EncoderPort>,
    profile: PlatformProfile,
    defaults: Defaults,
    overrides: StaticOverrides,
    environment: EnvVarsAdapter,
    config_file: Option<TomlConfigAdapter>,
}

impl DefaultAppContainer {
    /// Wire the `hcommand` host and the ffmpeg encoder
    pub fn new(options: ContainerOptions) -> MplayBatchResult<Self> {
        let profile = PlatformProfile::detect();
        let port = options.port.unwrap_or(DEFAULT_HOST_PORT);
        let host = match options.hcommand {
            Some(program) => HcommandHost::with_program(program, port),
            None => HcommandHost::new(port),
        };
        let encoder = FFmpegAdapter::new(profile.clone());
        let config_file = options
            .config_file
            .as_deref()
            .map(TomlConfigAdapter::load)
            .transpose()?;

        Ok(Self::with_ports(
            Arc::new(host),
            Arc::new(encoder),
            profile,
            options.overrides,
            config_file,
        ))
    }

    /// Wire explicit ports
    pub fn with_ports(
        host: Arc<dyn HostPort>,
        encoder: Arc<dyn EncoderPort>,
        profile: PlatformProfile,
        overrides: StaticOverrides,
        config_file: Option<TomlConfigAdapter>,
    ) -> Self {
        Self {
            host,
            encoder,
            profile,
            defaults: Defaults::default(),
            overrides,
            environment: EnvVarsAdapter::new(),
            config_file,
        }
    }

    /// Override layers, highest precedence first
    fn layers(&self) -> Vec<&dyn OverrideSource> {
        let mut layers = vec![&self.overrides as &dyn OverrideSource, &self.environment];
        if let Some(file) = &self.config_file {
            layers.push(file);
        }
        layers
    }
}

impl AppContainer for DefaultAppContainer {
    fn host(&self) -> Arc<dyn HostPort> {
        Arc::clone(&self.host)
    }

    fn encoder(&self) -> Arc<dyn EncoderPort> {
        Arc::clone(&self.encoder)
    }

    fn profile(&self) -> &PlatformProfile {
        &self.profile
    }

    fn resolve_settings(&self) -> MplayBatchResult<Arc<Settings>> {
        let layers = self.layers();
        debug!(
            "Override layers: {}",
            layers
                .iter()
                .map(|layer| layer.layer_name())
                .collect::<Vec<_>>()
                .join(" > ")
        );
        let settings = Settings::resolve(
            &layers,
            &self.defaults,
            self.host.as_ref(),
            self.encoder.as_ref(),
            self.profile.clone(),
        )?;
        Ok(Arc::new(settings))
    }
}
