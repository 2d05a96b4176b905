//! Mock declarations as supplied by the class-scanning bootstrap.

use smallvec::SmallVec;

use tm_ir::{MethodRef, Name, TypeRef};

/// What a declaration substitutes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MockKind {
    /// An instance or static method call.
    Method,
    /// A `new` expression of the declared return type.
    Constructor,
}

/// When a declaration is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum MockScope {
    /// Active in every test execution.
    #[default]
    Global,
    /// Active only while a test of the associated test class runs.
    Associated,
}

/// One mock: where its body lives and which calls it replaces.
///
/// The body is the static method `container.name(params) -> return_type`.
/// Without an explicit `target_class`, `params[0]` is the receiver type and
/// the remaining parameters are matched against the call; without an
/// explicit `target_method`, `name` is the target method name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MockDeclaration {
    pub container: Name,
    pub name: Name,
    pub target_class: Option<TypeRef>,
    pub target_method: Option<Name>,
    pub params: SmallVec<[TypeRef; 4]>,
    pub return_type: TypeRef,
    pub kind: MockKind,
    pub scope: MockScope,
    /// Test class an [`MockScope::Associated`] mock belongs to.
    pub test_class: Option<Name>,
}

impl MockDeclaration {
    /// Method mock with body `container.name(params) -> ret`.
    pub fn method(
        container: Name,
        name: Name,
        params: impl IntoIterator<Item = TypeRef>,
        ret: TypeRef,
    ) -> Self {
        Self {
            container,
            name,
            target_class: None,
            target_method: None,
            params: params.into_iter().collect(),
            return_type: ret,
            kind: MockKind::Method,
            scope: MockScope::Global,
            test_class: None,
        }
    }

    /// Constructor mock replacing `new ret(params)`.
    pub fn constructor(
        container: Name,
        name: Name,
        params: impl IntoIterator<Item = TypeRef>,
        ret: TypeRef,
    ) -> Self {
        Self {
            kind: MockKind::Constructor,
            ..Self::method(container, name, params, ret)
        }
    }

    #[must_use]
    pub fn target_class(mut self, ty: TypeRef) -> Self {
        self.target_class = Some(ty);
        self
    }

    #[must_use]
    pub fn target_method(mut self, method: Name) -> Self {
        self.target_method = Some(method);
        self
    }

    /// Restrict the mock to executions of `test_class`.
    #[must_use]
    pub fn associated_with(mut self, test_class: Name) -> Self {
        self.scope = MockScope::Associated;
        self.test_class = Some(test_class);
        self
    }

    /// The mock body's own identity in its container.
    pub fn body_ref(&self) -> MethodRef {
        MethodRef::new(self.container, self.name, self.params.iter().copied())
    }

    /// Whether call sites hand their receiver to the body.
    pub fn takes_receiver(&self) -> bool {
        self.kind == MockKind::Method && self.target_class.is_none()
    }

    /// Whether the mock dispatches in an execution of `test_class`.
    pub fn is_active_for(&self, test_class: Name) -> bool {
        match self.scope {
            MockScope::Global => true,
            MockScope::Associated => self.test_class == Some(test_class),
        }
    }
}
