use std::{path::Path, sync::Arc};

use ltc_service::DispositionService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<DispositionService>,
}
impl AppState {
	pub fn new(service: DispositionService) -> Self {
		Self { service: Arc::new(service) }
	}

	/// Loads the policy matrix named by the config and builds the configured discovery backend.
	pub fn from_config(config: &ltc_config::Config) -> color_eyre::Result<Self> {
		let matrix = ltc_config::load_matrix(Path::new(&config.policy.matrix_path))?;

		tracing::info!(
			matrix_version = matrix.version,
			scenarios = matrix.scenarios.len(),
			gates = matrix.trust_gate_definitions.len(),
			"Policy matrix loaded."
		);

		let service = DispositionService::from_config(config, matrix)?;

		Ok(Self::new(service))
	}
}
