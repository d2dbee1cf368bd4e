use ferrous_doh_domain::UpstreamSpec;
use hickory_proto::op::{Message, Query};

/// State of a single DoH request from parse to response.
#[derive(Debug, Clone)]
pub struct DnsTransaction {
    pub request: Message,
    pub response: Option<Message>,
    pub upstream: Option<UpstreamSpec>,
    /// The query carries ECS data supplied by the client itself.
    pub tailored: bool,
    pub from_cache: bool,
    client_id: Option<u16>,
}

impl DnsTransaction {
    pub fn new(request: Message, tailored: bool) -> Self {
        Self {
            request,
            response: None,
            upstream: None,
            tailored,
            from_cache: false,
            client_id: None,
        }
    }

    /// For client-supplied wire messages: the outgoing query gets a fresh
    /// random ID and the client's ID is put back on the response.
    pub fn with_client_id(mut request: Message, tailored: bool) -> Self {
        let client_id = request.id();
        request.set_id(fastrand::u16(..));
        Self {
            client_id: Some(client_id),
            ..Self::new(request, tailored)
        }
    }

    pub fn client_id(&self) -> Option<u16> {
        self.client_id
    }

    pub fn question(&self) -> Option<&Query> {
        self.request.queries().first()
    }

    /// Queries for the root zone always ask for recursion.
    pub fn force_recursion_for_root(&mut self) {
        if self.question().is_some_and(|q| q.name().is_root()) {
            self.request.set_recursion_desired(true);
        }
    }

    pub fn complete(&mut self, response: Message, upstream: Option<UpstreamSpec>, from_cache: bool) {
        self.response = Some(response);
        self.upstream = upstream;
        self.from_cache = from_cache;
    }
}
