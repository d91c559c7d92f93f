// ─── Network Defaults ────────────────────────────────────────────────────────

/// Default bind address for a relay node.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:9900";

/// How long a dial may take, connection and upgrade included (milliseconds).
pub const DEFAULT_DIAL_TIMEOUT_MS: u64 = 10_000;

// ─── Error Codes ─────────────────────────────────────────────────────────────

/// JSON-RPC error code: the hop has no route to the recipient.
pub const NOT_FOUND_CODE: i32 = -32004;

/// JSON-RPC error code: the next hop could not be reached.
pub const UNAVAILABLE_CODE: i32 = -32014;
