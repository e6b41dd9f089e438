//! Transport boundary: incoming method calls and their marshaled arguments.
//!
//! The bus layer hands the service a [`MethodCall`] carrying the caller
//! identity and a positional argument list. Nothing here performs
//! authorization; it only maps wire values to typed arguments.

use std::fmt;

use crate::request::{Principal, RequestMeta};

/// A single marshaled argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// A UTF-8 string
    Str(String),
    /// An array of strings
    StrArray(Vec<String>),
    /// An unsigned 32-bit integer
    U32(u32),
    /// A boolean
    Bool(bool),
}

impl Arg {
    /// Returns the wire type name used in argument errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Arg::Str(_) => "string",
            Arg::StrArray(_) => "array of string",
            Arg::U32(_) => "uint32",
            Arg::Bool(_) => "boolean",
        }
    }
}

/// Error produced when the arguments of a call do not match its signature.
///
/// The message is sent verbatim to the caller in an invalid-arguments reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgError {
    message: String,
}

impl ArgError {
    /// Creates an argument error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn wrong_type(index: usize, expected: &str, actual: &Arg) -> Self {
        Self::new(format!(
            "Argument {} is specified to be of type \"{}\", but is actually of type \"{}\"",
            index,
            expected,
            actual.type_name()
        ))
    }

    fn missing(found: usize) -> Self {
        Self::new(format!(
            "Message has only {} arguments, but more were expected",
            found
        ))
    }

    /// Returns the caller-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ArgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ArgError {}

/// Extracts request metadata from a transport-specific call type.
///
/// Bus integrations implement this to map their sender information to a
/// [`RequestMeta`]. It performs no authorization.
pub trait ExtractMetadata {
    /// Returns the request id and caller identity.
    fn extract_metadata(&self) -> RequestMeta;
}

/// An incoming method call on the groups interface.
///
/// # Examples
///
/// ```
/// use identity_groups::{Arg, MethodCall, Principal};
/// use identity_groups::call::ExtractMetadata;
///
/// let mut call = MethodCall::new("req-1");
/// call.set_caller(Some(Principal::named("uid:0")));
/// call.push_arg(Arg::StrArray(vec!["wheel".to_string()]));
/// call.push_arg(Arg::Str("LOCAL".to_string()));
///
/// let args = call.create_groups_args().expect("well-formed");
/// assert_eq!(args.names, vec!["wheel".to_string()]);
/// assert_eq!(call.extract_metadata().request_id, "req-1");
/// ```
#[derive(Debug, Clone)]
pub struct MethodCall {
    request_id: String,
    caller: Option<Principal>,
    args: Vec<Arg>,
}

impl MethodCall {
    /// Creates a call with no caller and no arguments.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            caller: None,
            args: Vec::new(),
        }
    }

    /// Sets the caller resolved by the transport.
    pub fn set_caller(&mut self, caller: Option<Principal>) {
        self.caller = caller;
    }

    /// Appends a positional argument.
    pub fn push_arg(&mut self, arg: Arg) {
        self.args.push(arg);
    }

    /// Builder-style variant of [`push_arg`](Self::push_arg).
    pub fn with_arg(mut self, arg: Arg) -> Self {
        self.args.push(arg);
        self
    }

    /// Builder-style variant of [`set_caller`](Self::set_caller).
    pub fn with_caller(mut self, caller: Principal) -> Self {
        self.caller = Some(caller);
        self
    }

    /// Returns the request id.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the caller, if known.
    pub fn caller(&self) -> Option<&Principal> {
        self.caller.as_ref()
    }

    /// Returns the raw argument list.
    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// Unmarshals the `(as, s)` signature of `CreateGroups`.
    ///
    /// Trailing arguments beyond the signature are ignored.
    ///
    /// # Errors
    ///
    /// Returns `ArgError` when an argument is missing or has the wrong type.
    pub fn create_groups_args(&self) -> Result<CreateGroupsArgs, ArgError> {
        let names = match self.args.first() {
            Some(Arg::StrArray(names)) => names.clone(),
            Some(other) => return Err(ArgError::wrong_type(0, "array of string", other)),
            None => return Err(ArgError::missing(0)),
        };
        let domain = match self.args.get(1) {
            Some(Arg::Str(domain)) => domain.clone(),
            Some(other) => return Err(ArgError::wrong_type(1, "string", other)),
            None => return Err(ArgError::missing(1)),
        };
        Ok(CreateGroupsArgs { names, domain })
    }
}

impl ExtractMetadata for MethodCall {
    fn extract_metadata(&self) -> RequestMeta {
        RequestMeta {
            request_id: self.request_id.clone(),
            principal: self.caller.clone(),
        }
    }
}

/// Typed arguments of a `CreateGroups` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGroupsArgs {
    /// Group names in creation order
    pub names: Vec<String>,
    /// Domain name exactly as the caller spelled it
    pub domain: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_domain() {
        let call = MethodCall::new("req-1")
            .with_arg(Arg::StrArray(vec!["a".to_string(), "b".to_string()]))
            .with_arg(Arg::Str("LOCAL".to_string()));

        let args = call.create_groups_args().unwrap();
        assert_eq!(args.names, vec!["a", "b"]);
        assert_eq!(args.domain, "LOCAL");
    }

    #[test]
    fn wrong_first_type_is_reported() {
        let call = MethodCall::new("req-2")
            .with_arg(Arg::Str("a".to_string()))
            .with_arg(Arg::Str("LOCAL".to_string()));

        let err = call.create_groups_args().unwrap_err();
        assert_eq!(
            err.message(),
            "Argument 0 is specified to be of type \"array of string\", but is actually of type \"string\""
        );
    }

    #[test]
    fn missing_domain_is_reported() {
        let call = MethodCall::new("req-3").with_arg(Arg::StrArray(vec![]));

        let err = call.create_groups_args().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Message has only 1 arguments, but more were expected"
        );
    }

    #[test]
    fn empty_call_is_reported() {
        let err = MethodCall::new("req-4").create_groups_args().unwrap_err();
        assert!(err.message().contains("only 0 arguments"));
    }

    #[test]
    fn metadata_carries_caller() {
        let call = MethodCall::new("req-5").with_caller(Principal::named("uid:0"));
        let meta = call.extract_metadata();

        assert_eq!(meta.request_id, "req-5");
        assert_eq!(meta.principal.unwrap().id, "uid:0");
    }
}
