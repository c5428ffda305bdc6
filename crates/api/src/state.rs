use std::sync::Arc;

use formkit_core::assets::{AssetStore, LocalAssetStore};
use formkit_core::short_id::ShortIdCodec;

use crate::config::ServerConfig;

/// Services every handler can reach through `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub pool: formkit_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Existence checks for uploaded form images.
    pub assets: Arc<dyn AssetStore>,
    /// Encoder for public form identifiers.
    pub short_ids: Arc<ShortIdCodec>,
}

impl AppState {
    /// State backed by the local asset directory and salt from `config`.
    pub fn new(pool: formkit_db::DbPool, config: ServerConfig) -> Self {
        let assets = Arc::new(LocalAssetStore::new(&config.asset_root));
        let short_ids = Arc::new(ShortIdCodec::new(&config.public_id_salt));
        Self {
            pool,
            config: Arc::new(config),
            assets,
            short_ids,
        }
    }
}
