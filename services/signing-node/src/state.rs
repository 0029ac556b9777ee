use chainsign_core::CryptoConfig;
use chainsign_signing::SigningService;

pub struct AppState {
    pub signing: SigningService,
}

impl AppState {
    pub fn new(crypto: &CryptoConfig) -> Self {
        AppState {
            signing: SigningService::new(crypto),
        }
    }
}
