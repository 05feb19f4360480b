//! The fixed HTTP method set.
//!
//! # Design Decisions
//! - Closed enum: every method owns a slot in the route table
//! - Tokens are case-sensitive, as sent on the wire
//! - Anything outside the set is rejected at registration

use std::fmt;
use std::str::FromStr;

use crate::error::RouteError;

/// An HTTP method the router can register routes for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Get,
    Head,
    Put,
    Post,
    Delete,
    Options,
    Patch,
    Trace,
    Connect,
    Copy,
    Link,
    Unlink,
    Purge,
    Lock,
    Unlock,
    Propfind,
    View,
}

impl Method {
    /// Every supported method, in table order.
    pub const ALL: [Method; 17] = [
        Method::Get,
        Method::Head,
        Method::Put,
        Method::Post,
        Method::Delete,
        Method::Options,
        Method::Patch,
        Method::Trace,
        Method::Connect,
        Method::Copy,
        Method::Link,
        Method::Unlink,
        Method::Purge,
        Method::Lock,
        Method::Unlock,
        Method::Propfind,
        Method::View,
    ];

    /// Wire token for this method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Patch => "PATCH",
            Method::Trace => "TRACE",
            Method::Connect => "CONNECT",
            Method::Copy => "COPY",
            Method::Link => "LINK",
            Method::Unlink => "UNLINK",
            Method::Purge => "PURGE",
            Method::Lock => "LOCK",
            Method::Unlock => "UNLOCK",
            Method::Propfind => "PROPFIND",
            Method::View => "VIEW",
        }
    }

    /// Position of this method in [`Method::ALL`].
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| RouteError::UnknownMethod(s.to_string()))
    }
}

/// Conversion of the `method` argument of a registration call.
///
/// Accepts a single method or a list of them, typed or as tokens.
pub trait IntoMethods {
    fn into_methods(self) -> Result<Vec<Method>, RouteError>;
}

impl IntoMethods for Method {
    fn into_methods(self) -> Result<Vec<Method>, RouteError> {
        Ok(vec![self])
    }
}

impl IntoMethods for &str {
    fn into_methods(self) -> Result<Vec<Method>, RouteError> {
        Ok(vec![self.parse()?])
    }
}

impl IntoMethods for String {
    fn into_methods(self) -> Result<Vec<Method>, RouteError> {
        self.as_str().into_methods()
    }
}

impl IntoMethods for &[Method] {
    fn into_methods(self) -> Result<Vec<Method>, RouteError> {
        non_empty(self.to_vec())
    }
}

impl IntoMethods for &[&str] {
    fn into_methods(self) -> Result<Vec<Method>, RouteError> {
        non_empty(self.iter().map(|s| s.parse()).collect::<Result<_, _>>()?)
    }
}

impl IntoMethods for &[String] {
    fn into_methods(self) -> Result<Vec<Method>, RouteError> {
        non_empty(self.iter().map(|s| s.parse()).collect::<Result<_, _>>()?)
    }
}

impl<const N: usize> IntoMethods for [Method; N] {
    fn into_methods(self) -> Result<Vec<Method>, RouteError> {
        self.as_slice().into_methods()
    }
}

impl<const N: usize> IntoMethods for [&str; N] {
    fn into_methods(self) -> Result<Vec<Method>, RouteError> {
        self.as_slice().into_methods()
    }
}

impl IntoMethods for Vec<Method> {
    fn into_methods(self) -> Result<Vec<Method>, RouteError> {
        non_empty(self)
    }
}

impl IntoMethods for Vec<&str> {
    fn into_methods(self) -> Result<Vec<Method>, RouteError> {
        self.as_slice().into_methods()
    }
}

impl IntoMethods for Vec<String> {
    fn into_methods(self) -> Result<Vec<Method>, RouteError> {
        self.as_slice().into_methods()
    }
}

fn non_empty(methods: Vec<Method>) -> Result<Vec<Method>, RouteError> {
    if methods.is_empty() {
        return Err(RouteError::InvalidMethodArgument(
            "at least one method is expected".to_string(),
        ));
    }
    Ok(methods)
}
