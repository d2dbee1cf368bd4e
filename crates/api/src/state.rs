use ferrous_doh_application::services::ClientAddressResolver;
use ferrous_doh_application::use_cases::ResolveQueryUseCase;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub resolve_query: Arc<ResolveQueryUseCase>,
    pub client_addresses: Arc<ClientAddressResolver>,
    /// Request headers echoed to the debug log, matched case-insensitively.
    pub debug_headers: Arc<[String]>,
}
