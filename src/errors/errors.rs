use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Option<Position>,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position: Some(position),
        }
    }

    pub fn get_position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::InvalidPrecedence { .. } => "InvalidPrecedence",
            ErrorImpl::InvalidOperatorArity { .. } => "InvalidOperatorArity",
            ErrorImpl::UnknownVariable { .. } => "UnknownVariable",
            ErrorImpl::InvalidAssignmentTarget => "InvalidAssignmentTarget",
            ErrorImpl::InvalidBinaryOperator { .. } => "InvalidBinaryOperator",
            ErrorImpl::UnknownUnaryOperator { .. } => "UnknownUnaryOperator",
            ErrorImpl::UnknownFunction { .. } => "UnknownFunction",
            ErrorImpl::IncorrectArgumentCount { .. } => "IncorrectArgumentCount",
            ErrorImpl::FunctionRedefinition { .. } => "FunctionRedefinition",
            ErrorImpl::ArityRedefinition { .. } => "ArityRedefinition",
            ErrorImpl::FunctionBody { .. } => "FunctionBody",
            ErrorImpl::VerificationFailed { .. } => "VerificationFailed",
            ErrorImpl::NoInsertionPoint => "NoInsertionPoint",
            ErrorImpl::Builder { .. } => "Builder",
            ErrorImpl::TargetInitialization { .. } => "TargetInitialization",
            ErrorImpl::ExecutionEngine { .. } => "ExecutionEngine",
            ErrorImpl::Emission { .. } => "Emission",
            ErrorImpl::Io { .. } => "Io",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => {
                ErrorTip::Suggestion(format!("Invalid number: `{}`", token))
            }
            ErrorImpl::InvalidPrecedence { value } => ErrorTip::Suggestion(format!(
                "Precedence `{}` must be between 1 and 100",
                value
            )),
            ErrorImpl::InvalidOperatorArity { operator, expected, received } => {
                ErrorTip::Suggestion(format!(
                    "Operator `{}` takes {} operands, received {}",
                    operator, expected, received
                ))
            }
            ErrorImpl::UnknownVariable { variable } => {
                ErrorTip::Suggestion(format!("Variable `{}` is not in scope", variable))
            }
            ErrorImpl::InvalidAssignmentTarget => {
                ErrorTip::Suggestion(String::from("Only a variable name can be assigned to"))
            }
            ErrorImpl::InvalidBinaryOperator { operator } => ErrorTip::Suggestion(format!(
                "Define it first with `def binary{} <precedence> (lhs rhs) ...`",
                operator
            )),
            ErrorImpl::UnknownUnaryOperator { operator } => ErrorTip::Suggestion(format!(
                "Define it first with `def unary{} (operand) ...`",
                operator
            )),
            ErrorImpl::UnknownFunction { function } => ErrorTip::Suggestion(format!(
                "Function `{}` is neither defined nor declared with `extern`",
                function
            )),
            ErrorImpl::IncorrectArgumentCount { expected, received, .. } => {
                ErrorTip::Suggestion(format!(
                    "Expected {} arguments, received {}",
                    expected, received
                ))
            }
            ErrorImpl::FunctionRedefinition { function } => {
                ErrorTip::Suggestion(format!("Function `{}` already has a body", function))
            }
            ErrorImpl::ArityRedefinition { expected, received, .. } => {
                ErrorTip::Suggestion(format!(
                    "Previously declared with {} parameters, redeclared with {}",
                    expected, received
                ))
            }
            ErrorImpl::FunctionBody { cause, .. } => {
                ErrorTip::Suggestion(cause.internal_error.to_string())
            }
            ErrorImpl::VerificationFailed { .. } => ErrorTip::None,
            ErrorImpl::NoInsertionPoint => ErrorTip::None,
            ErrorImpl::Builder { .. } => ErrorTip::None,
            ErrorImpl::TargetInitialization { .. } => ErrorTip::None,
            ErrorImpl::ExecutionEngine { .. } => ErrorTip::None,
            ErrorImpl::Emission { .. } => ErrorTip::None,
            ErrorImpl::Io { .. } => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.internal_error)
    }
}

impl std::error::Error for Error {}

impl From<ErrorImpl> for Error {
    fn from(error_impl: ErrorImpl) -> Self {
        Error {
            internal_error: error_impl,
            position: None,
        }
    }
}

impl From<inkwell::builder::BuilderError> for Error {
    fn from(error: inkwell::builder::BuilderError) -> Self {
        ErrorImpl::Builder {
            message: error.to_string(),
        }
        .into()
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        ErrorImpl::Io {
            message: error.to_string(),
        }
        .into()
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("invalid precedence: {value}")]
    InvalidPrecedence { value: f64 },
    #[error("invalid number of operands for operator {operator:?}: expected {expected}, received {received}")]
    InvalidOperatorArity {
        operator: String,
        expected: usize,
        received: usize,
    },
    #[error("unknown variable name {variable:?}")]
    UnknownVariable { variable: String },
    #[error("destination of '=' must be a variable")]
    InvalidAssignmentTarget,
    #[error("invalid binary operator {operator:?}")]
    InvalidBinaryOperator { operator: char },
    #[error("unknown unary operator {operator:?}")]
    UnknownUnaryOperator { operator: char },
    #[error("unknown function referenced: {function:?}")]
    UnknownFunction { function: String },
    #[error("incorrect number of arguments passed to {function:?}: expected {expected}, received {received}")]
    IncorrectArgumentCount {
        function: String,
        expected: usize,
        received: usize,
    },
    #[error("redefinition of function: {function:?}")]
    FunctionRedefinition { function: String },
    #[error("redefinition of function {function:?} with different number of args: expected {expected}, received {received}")]
    ArityRedefinition {
        function: String,
        expected: usize,
        received: usize,
    },
    #[error("function body of {function:?} failed: {cause}")]
    FunctionBody { function: String, cause: Box<Error> },
    #[error("function verification failed: {function:?}")]
    VerificationFailed { function: String },
    #[error("builder has no insertion point inside a function")]
    NoInsertionPoint,
    #[error("IR builder error: {message}")]
    Builder { message: String },
    #[error("target initialization error: {message}")]
    TargetInitialization { message: String },
    #[error("JIT execution engine error: {message}")]
    ExecutionEngine { message: String },
    #[error("can not emit module: {message}")]
    Emission { message: String },
    #[error("I/O error: {message}")]
    Io { message: String },
}
