use std::collections::HashSet;

use super::identifier::Identifier;
use super::selector::Selector;
use crate::frontend::ast::{EnumConstant, Member, Modifiers, TypeDecl, Visibility};

/// A declared name, dispatched by kind.
#[derive(Debug, Clone)]
pub enum Entity {
    Class(ClassEntity),
    Method(MemberEntity),
    Variable(MemberEntity),
    TypeParameter(MemberEntity),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Class,
    Method,
    Variable,
    TypeParameter,
}

/// Name, visibility, and staticness shared by the non-class entity kinds.
#[derive(Debug, Clone)]
pub struct MemberEntity {
    pub name: Identifier,
    pub visibility: Visibility,
    pub is_static: bool,
}

impl MemberEntity {
    #[must_use]
    pub fn new(name: impl Into<Identifier>, visibility: Visibility, is_static: bool) -> Self {
        Self {
            name: name.into(),
            visibility,
            is_static,
        }
    }
}

impl Entity {
    #[must_use]
    pub fn method(name: impl Into<Identifier>, modifiers: &Modifiers) -> Self {
        Entity::Method(MemberEntity::new(
            name,
            modifiers.visibility,
            modifiers.is_static,
        ))
    }

    #[must_use]
    pub fn variable(name: impl Into<Identifier>, modifiers: &Modifiers) -> Self {
        Entity::Variable(MemberEntity::new(
            name,
            modifiers.visibility,
            modifiers.is_static,
        ))
    }

    /// A local binding: package visibility, never static.
    #[must_use]
    pub fn local(name: impl Into<Identifier>) -> Self {
        Entity::Variable(MemberEntity::new(name, Visibility::Package, false))
    }

    #[must_use]
    pub fn type_parameter(name: impl Into<Identifier>) -> Self {
        Entity::TypeParameter(MemberEntity::new(name, Visibility::Package, false))
    }

    #[must_use]
    pub fn name(&self) -> &Identifier {
        match self {
            Entity::Class(class) => &class.name,
            Entity::Method(member) | Entity::Variable(member) | Entity::TypeParameter(member) => {
                &member.name
            }
        }
    }

    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Class(_) => EntityKind::Class,
            Entity::Method(_) => EntityKind::Method,
            Entity::Variable(_) => EntityKind::Variable,
            Entity::TypeParameter(_) => EntityKind::TypeParameter,
        }
    }

    #[must_use]
    pub fn as_class(&self) -> Option<&ClassEntity> {
        match self {
            Entity::Class(class) => Some(class),
            _ => None,
        }
    }
}

/// A class declaration's shape: its declared superclass path and the member
/// names it contributes to subclasses. `members` covers this class's own
/// declarations only, never the inherited ones.
#[derive(Debug, Clone)]
pub struct ClassEntity {
    pub name: Identifier,
    pub visibility: Visibility,
    pub is_static: bool,
    pub superclass: Option<Selector>,
    members: HashSet<Identifier>,
}

impl ClassEntity {
    #[must_use]
    pub fn new(
        name: impl Into<Identifier>,
        superclass: Option<Selector>,
        members: HashSet<Identifier>,
    ) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Package,
            is_static: false,
            superclass,
            members,
        }
    }

    /// Shape a parsed declaration: declared superclass path plus every
    /// non-private member name (fields, methods, nested types, enum
    /// constants).
    #[must_use]
    pub fn from_decl(decl: &TypeDecl) -> Self {
        let superclass = decl
            .superclass
            .as_ref()
            .and_then(Selector::from_type);
        let mut members = HashSet::new();
        collect_member_names(&decl.members, &decl.enum_constants, &mut members);
        Self {
            name: Identifier::new(decl.name.clone()),
            visibility: decl.modifiers.visibility,
            is_static: decl.modifiers.is_static,
            superclass,
            members,
        }
    }

    #[must_use]
    pub fn members(&self) -> &HashSet<Identifier> {
        &self.members
    }

    #[must_use]
    pub fn superclass(&self) -> Option<&Selector> {
        self.superclass.as_ref()
    }
}

fn collect_member_names(
    members: &[Member],
    enum_constants: &[EnumConstant],
    into: &mut HashSet<Identifier>,
) {
    for constant in enum_constants {
        into.insert(Identifier::new(constant.name.clone()));
    }
    for member in members {
        match member {
            Member::Field(field) => {
                if field.modifiers.visibility.visible_to_subclasses() {
                    for declarator in &field.declarators {
                        into.insert(Identifier::new(declarator.name.clone()));
                    }
                }
            }
            Member::Method(method) => {
                if !method.is_constructor && method.modifiers.visibility.visible_to_subclasses() {
                    into.insert(Identifier::new(method.name.clone()));
                }
            }
            Member::Type(nested) => {
                if nested.modifiers.visibility.visible_to_subclasses() {
                    into.insert(Identifier::new(nested.name.clone()));
                }
            }
            Member::Initializer(_) => {}
        }
    }
}
