//! Member decoration instructions
//!
//! A [`MemberInstruction`] describes one decoration site: the decorators
//! to apply, what kind of member they apply to, its name, and for private
//! members the raw implementations the engine cannot look up by name.
//!
//! Call sites emit instructions in a packed form:
//! `[decorators, flags, name, ...private implementations]`, where `flags`
//! carries the member kind in its low three bits plus [`STATIC_FLAG`] and
//! [`DECORATORS_HAVE_THIS_FLAG`]. [`MemberInstruction::from_parts`] decodes
//! that form once so the rest of the engine dispatches on typed records.

use std::rc::Rc;

use crate::error::{DecoratorError, DecoratorResult};
use crate::value::Value;

/// Packed flag: member is static
pub const STATIC_FLAG: u8 = 8;

/// Packed flag: decorators are stored as `[receiver, decorator, ...]` pairs
pub const DECORATORS_HAVE_THIS_FLAG: u8 = 16;

const KIND_MASK: u8 = 0b111;

/// Kind of decorated member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Plain field
    Field,
    /// Auto-accessor: a get/set pair decorated as one unit
    Accessor,
    /// Method
    Method,
    /// Getter
    Getter,
    /// Setter
    Setter,
}

impl MemberKind {
    /// Decode the packed kind code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(MemberKind::Field),
            1 => Some(MemberKind::Accessor),
            2 => Some(MemberKind::Method),
            3 => Some(MemberKind::Getter),
            4 => Some(MemberKind::Setter),
            _ => None,
        }
    }

    /// Packed kind code
    pub fn code(self) -> u8 {
        match self {
            MemberKind::Field => 0,
            MemberKind::Accessor => 1,
            MemberKind::Method => 2,
            MemberKind::Getter => 3,
            MemberKind::Setter => 4,
        }
    }

    /// Name exposed to decorators as `context.kind`
    pub fn as_str(self) -> &'static str {
        match self {
            MemberKind::Field => "field",
            MemberKind::Accessor => "accessor",
            MemberKind::Method => "method",
            MemberKind::Getter => "getter",
            MemberKind::Setter => "setter",
        }
    }

    /// Fields and accessors contribute a per-member initializer
    pub fn has_initializer(self) -> bool {
        matches!(self, MemberKind::Field | MemberKind::Accessor)
    }
}

/// Member kind plus scope and receiver-binding mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberFlags {
    /// Member kind
    pub kind: MemberKind,
    /// Static (construct-level) member
    pub is_static: bool,
    /// Decorators carry a bound receiver
    pub has_bound_receiver: bool,
}

impl MemberFlags {
    /// Instance-scope flags without bound receivers
    pub fn new(kind: MemberKind) -> Self {
        Self {
            kind,
            is_static: false,
            has_bound_receiver: false,
        }
    }

    /// Decode packed flags
    pub fn from_packed(packed: u8) -> DecoratorResult<Self> {
        let kind = MemberKind::from_code(packed & KIND_MASK).ok_or_else(|| {
            DecoratorError::type_mismatch(format!("invalid member kind in flags {:#x}", packed))
        })?;
        Ok(Self {
            kind,
            is_static: packed & STATIC_FLAG != 0,
            has_bound_receiver: packed & DECORATORS_HAVE_THIS_FLAG != 0,
        })
    }

    /// Encode as packed flags
    pub fn packed(self) -> u8 {
        let mut packed = self.kind.code();
        if self.is_static {
            packed |= STATIC_FLAG;
        }
        if self.has_bound_receiver {
            packed |= DECORATORS_HAVE_THIS_FLAG;
        }
        packed
    }
}

/// Decorators attached to one site
#[derive(Debug, Clone)]
pub enum Decorators {
    /// A single decorator
    One(Value),
    /// Decorators in source order, or `[receiver, decorator, ...]` pairs
    List(Vec<Value>),
}

impl Decorators {
    /// Flat decorator sequence
    pub fn to_vec(&self) -> Vec<Value> {
        match self {
            Decorators::One(decorator) => vec![decorator.clone()],
            Decorators::List(list) => list.clone(),
        }
    }
}

impl From<Value> for Decorators {
    fn from(decorator: Value) -> Self {
        Decorators::One(decorator)
    }
}

impl From<Vec<Value>> for Decorators {
    fn from(list: Vec<Value>) -> Self {
        Decorators::List(list)
    }
}

/// One decorator invocation: the decorator and the receiver it is called with
#[derive(Debug, Clone)]
pub(crate) struct DecoratorCall {
    pub receiver: Value,
    pub decorator: Value,
}

/// Order decorators are applied in: last to first, stepping over bound
/// receivers when present.
pub(crate) fn application_order(list: &[Value], bound_receivers: bool) -> Vec<DecoratorCall> {
    let step = if bound_receivers { 2 } else { 1 };
    let mut calls = Vec::with_capacity(list.len() / step + 1);
    let mut index = list.len();
    while index > 0 {
        let at = index - 1;
        let receiver = if bound_receivers && at > 0 {
            list[at - 1].clone()
        } else {
            Value::Undefined
        };
        calls.push(DecoratorCall {
            receiver,
            decorator: list[at].clone(),
        });
        index = index.saturating_sub(step);
    }
    calls
}

/// Raw implementations supplied for private members
#[derive(Debug, Clone)]
pub enum PrivateImpl {
    /// Fields and accessors: `(target) -> value` and `(target, value)`
    Slot {
        /// Reads the private slot of its first argument
        get: Value,
        /// Writes its second argument into the private slot of its first
        set: Value,
    },
    /// Methods, getters and setters: the receiver-bound implementation
    Function(Value),
}

/// One member decoration site
#[derive(Debug, Clone)]
pub struct MemberInstruction {
    /// Decorators to apply
    pub decorators: Decorators,
    /// Kind, scope and receiver mode
    pub flags: MemberFlags,
    /// Public name, or the private slot identifier without its `#`
    pub name: Rc<str>,
    /// Raw implementations when the member is private
    pub private: Option<PrivateImpl>,
}

impl MemberInstruction {
    /// Create an instance-scope, public instruction
    pub fn new(kind: MemberKind, name: &str, decorators: impl Into<Decorators>) -> Self {
        Self {
            decorators: decorators.into(),
            flags: MemberFlags::new(kind),
            name: Rc::from(name),
            private: None,
        }
    }

    /// Mark the member as static
    pub fn as_static(mut self) -> Self {
        self.flags.is_static = true;
        self
    }

    /// Decorators are `[receiver, decorator, ...]` pairs
    pub fn with_bound_receivers(mut self) -> Self {
        self.flags.has_bound_receiver = true;
        self
    }

    /// Make the member private, supplying its raw implementation
    pub fn private(mut self, implementation: PrivateImpl) -> Self {
        self.private = Some(implementation);
        self
    }

    /// Decode the packed call-site form.
    ///
    /// `trailing` holds the private implementations; it is empty for public
    /// members.
    pub fn from_parts(
        decorators: impl Into<Decorators>,
        packed: u8,
        name: &str,
        trailing: &[Value],
    ) -> DecoratorResult<Self> {
        let flags = MemberFlags::from_packed(packed)?;
        let private = match trailing {
            [] => None,
            [get, set] if flags.kind.has_initializer() => Some(PrivateImpl::Slot {
                get: get.clone(),
                set: set.clone(),
            }),
            [function] if !flags.kind.has_initializer() => {
                Some(PrivateImpl::Function(function.clone()))
            }
            _ => {
                return Err(DecoratorError::type_mismatch(format!(
                    "private {} `{}` supplied {} implementation values",
                    flags.kind.as_str(),
                    name,
                    trailing.len()
                )))
            }
        };
        let instruction = Self {
            decorators: decorators.into(),
            flags,
            name: Rc::from(name),
            private,
        };
        instruction.validate()?;
        Ok(instruction)
    }

    /// Member kind
    pub fn kind(&self) -> MemberKind {
        self.flags.kind
    }

    /// Check if the member is private
    pub fn is_private(&self) -> bool {
        self.private.is_some()
    }

    /// Check that private implementations match the member kind
    pub fn validate(&self) -> DecoratorResult<()> {
        let matches = match (&self.private, self.kind().has_initializer()) {
            (None, _) => true,
            (Some(PrivateImpl::Slot { .. }), true) => true,
            (Some(PrivateImpl::Function(_)), false) => true,
            _ => false,
        };
        if matches {
            Ok(())
        } else {
            Err(DecoratorError::type_mismatch(format!(
                "private {} `{}` has an implementation of the wrong shape",
                self.kind().as_str(),
                self.name
            )))
        }
    }
}

/// Entry in a construct's member instruction list
#[derive(Debug, Clone)]
pub enum MemberEntry {
    /// A decoration site
    Member(MemberInstruction),
    /// Placeholder for a computed key; carries no decoration work
    Computed,
}

impl From<MemberInstruction> for MemberEntry {
    fn from(instruction: MemberInstruction) -> Self {
        MemberEntry::Member(instruction)
    }
}
