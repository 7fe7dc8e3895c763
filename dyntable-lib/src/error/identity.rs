//! Identity allocation errors

/// Errors from the row identity allocator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// No unique candidate was found within the retry budget.
    ///
    /// Fatal for the mutation that triggered allocation: the table cannot
    /// hold rows without unique identities.
    #[error("failed to allocate a unique row id after {attempts} attempts")]
    Exhausted {
        /// How many candidates were tried.
        attempts: u32,
    },

    /// The configured alphabet has no characters to draw from.
    #[error("identity alphabet is empty")]
    EmptyAlphabet,
}
