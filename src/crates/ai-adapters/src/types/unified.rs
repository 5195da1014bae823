/// Token accounting reported by the provider, usually on the last chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnifiedTokenUsage {
    pub prompt_token_count: u32,
    pub candidates_token_count: u32,
    pub total_token_count: u32,
    pub cached_content_token_count: Option<u32>,
}

/// A fragment of a streamed tool call.
///
/// The first fragment for an `index` carries `id` and `name`; later fragments
/// only append to `arguments`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnifiedToolCall {
    pub index: usize,
    pub id: Option<String>,
    pub name: Option<String>,
    pub arguments: Option<String>,
}

/// One provider-neutral stream event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnifiedResponse {
    pub text: Option<String>,
    pub reasoning_content: Option<String>,
    pub tool_call: Option<UnifiedToolCall>,
    pub usage: Option<UnifiedTokenUsage>,
    pub finish_reason: Option<String>,
}
