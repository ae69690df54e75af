/// Error types for transaction building, signing, and address handling.
///
/// Groups the failure modes a build call can surface: configuration
/// errors (fail fast before any transaction work), address decode
/// errors, fund-selection errors, script/signing errors, and plugin
/// errors. No variant leaves partial state behind.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A required component was not supplied to the kit builder.
    #[error("kit not configured: missing {0}")]
    NotConfigured(&'static str),

    /// No registered address converter accepted the string or type.
    #[error("unknown address type")]
    UnknownAddressType,

    /// An address failed to decode (bad charset, checksum, length, or
    /// network prefix).
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The requested value was zero.
    #[error("wrong value")]
    WrongValue,

    /// The spendable UTXO pool is empty.
    #[error("no spendable outputs")]
    EmptyUnspentOutputs,

    /// Every selector strategy was exhausted without covering the target.
    #[error("insufficient funds")]
    InsufficientFunds,

    /// The resulting recipient value would be below the dust threshold.
    #[error("value is below dust threshold")]
    Dust,

    /// The value exceeds the aggregate plugin spend limit.
    #[error("value exceeds maximum spend limit")]
    ExceedsMaxSpendLimit,

    /// The previous output's script type cannot be signed by this kit.
    #[error("script type not supported for signing")]
    NotSupportedScriptType,

    /// A P2SH/P2WSH input has no redeem script attached.
    #[error("no redeem script")]
    NoRedeemScript,

    /// A previous output lacks the key hash needed for its script code.
    #[error("no previous output key hash")]
    NoPreviousOutputKeyHash,

    /// The pipeline was driven out of order (no recipient set).
    #[error("no recipient address set")]
    NoRecipientAddress,

    /// The caller supplied a different number of signatures than inputs.
    #[error("signature count mismatch: expected {expected}, got {got}")]
    SignatureCountMismatch {
        /// Number of inputs awaiting signatures.
        expected: usize,
        /// Number of signatures supplied.
        got: usize,
    },

    /// Plugin data referenced an unregistered plugin id.
    #[error("plugin not found: {0}")]
    PluginNotFound(u8),

    /// A plugin rejected the build.
    #[error("plugin error: {0}")]
    Plugin(String),

    /// Serialized transaction data was malformed.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    /// An underlying script error.
    #[error("script error: {0}")]
    Script(#[from] txforge_script::ScriptError),

    /// An underlying primitives error.
    #[error("primitives error: {0}")]
    Primitives(#[from] txforge_primitives::PrimitivesError),
}
