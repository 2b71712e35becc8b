//! Declaration macros for node types and enumerations.

/// Declares a node type.
///
/// Every field is a feature unless marked:
/// - `[internal]` bookkeeping, not part of the model
/// - `[link]` a non-owning node relation, never treated as a containment
/// - `[derived]` a feature excluded from structural equality and serialization
///
/// Containment and reference fields may name their expected node type with
/// `as "qualified.Type"`. Internal, link and derived fields must implement
/// `Default`, since generic construction does not supply them.
///
/// # Example
/// ```ignore
/// node_type! {
///     #[derive(PartialEq)]
///     pub struct Block : "my.lang.Block" implements ["my.lang.Statement"] {
///         pub name: String,
///         pub statements: Vec<NodeId> as "my.lang.Statement",
///         pub target: Option<ReferenceByName> as "my.lang.Block",
///         [derived] pub size: i64,
///         [internal] pub visited: bool,
///     }
/// }
/// ```
#[macro_export]
macro_rules! node_type {
    // Field normalization: an optional `[marker]` directly before a `vis`
    // fragment is a local ambiguity for `macro_rules!`, so fields are munched
    // one at a time into a bracketed form before expansion.
    (@munch [$($header:tt)*] [$($acc:tt)*]) => {
        $crate::node_type!(@emit [$($header)*] [$($acc)*]);
    };
    (@munch [$($header:tt)*] [$($acc:tt)*]
        $(#[$fmeta:meta])*
        [$marker:ident] $fvis:vis $field:ident : $fty:ty $(as $target:literal)?
        $(, $($rest:tt)*)?
    ) => {
        $crate::node_type!(@munch [$($header)*]
            [$($acc)* { $(#[$fmeta])* [$marker] $fvis $field : $fty [$($target)?] }]
            $($($rest)*)?);
    };
    (@munch [$($header:tt)*] [$($acc:tt)*]
        $(#[$fmeta:meta])*
        $fvis:vis $field:ident : $fty:ty $(as $target:literal)?
        $(, $($rest:tt)*)?
    ) => {
        $crate::node_type!(@munch [$($header)*]
            [$($acc)* { $(#[$fmeta])* [] $fvis $field : $fty [$($target)?] }]
            $($($rest)*)?);
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident : $type_name:literal
        $(extends $parent:literal)?
        $(implements [$($role:literal),* $(,)?])?
        {
            $($body:tt)*
        }
    ) => {
        $crate::node_type!(@munch [
            $(#[$meta])*
            $vis struct $name : $type_name
            $(extends $parent)?
            $(implements [$($role),*])?
        ] [] $($body)*);
    };
    (@emit [
        $(#[$meta:meta])*
        $vis:vis struct $name:ident : $type_name:literal
        $(extends $parent:literal)?
        $(implements [$($role:literal),* $(,)?])?
    ] [
        $({
            $(#[$fmeta:meta])*
            [$($marker:ident)?] $fvis:vis $field:ident : $fty:ty [$($target:literal)?]
        })*
    ]) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $fty,
            )*
        }

        impl $crate::model::NodeData for $name {
            fn node_type(&self) -> &'static str {
                $type_name
            }

            fn feature_value(&self, feature: &str) -> ::std::option::Option<$crate::model::Value> {
                let _ = feature;
                $( $crate::__node_field!(@get self, feature, [$($marker)?], $field); )*
                None
            }

            fn set_feature_value(
                &mut self,
                feature: &str,
                value: $crate::model::Value,
            ) -> ::std::result::Result<(), $crate::model::ValueError> {
                let _ = &value;
                $( $crate::__node_field!(@set self, feature, value, [$($marker)?], $field, $fty); )*
                Err($crate::model::ValueError::UnknownFeature(feature.to_string()))
            }

            fn clone_data(&self) -> ::std::boxed::Box<dyn $crate::model::NodeData> {
                ::std::boxed::Box::new(::std::clone::Clone::clone(self))
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }
        }

        impl $crate::model::NodeKind for $name {
            const NODE_TYPE: &'static str = $type_name;

            fn declaration() -> $crate::model::NodeTypeDeclaration {
                let descriptors: ::std::vec::Vec<::std::option::Option<$crate::model::FeatureDescriptor>> = vec![
                    $( $crate::__node_field!(@descriptor [$($marker)?], $field, $fty, [$($target)?]) ),*
                ];
                let extends: ::std::option::Option<&'static str> = None $( .or(Some($parent)) )?;
                $crate::model::NodeTypeDeclaration {
                    name: $type_name,
                    extends,
                    implements: vec![$($($role),*)?],
                    features: descriptors.into_iter().flatten().collect(),
                    construct: |mut values| {
                        let node = <Self as $crate::model::NodeKind>::from_features(&mut values)?;
                        Ok(::std::boxed::Box::new(node))
                    },
                }
            }

            fn from_features(
                values: &mut $crate::model::FeatureValues,
            ) -> ::std::result::Result<Self, $crate::model::ValueError> {
                let _ = &values;
                Ok(Self {
                    $( $field: $crate::__node_field!(@init values, [$($marker)?], $field, $fty), )*
                })
            }
        }
    };
}

/// Per-field expansion of [`node_type!`], dispatched on the field marker.
#[doc(hidden)]
#[macro_export]
macro_rules! __node_field {
    // Internal and link fields are invisible to the model.
    (@get $this:ident, $feature:ident, [internal], $field:ident) => {};
    (@get $this:ident, $feature:ident, [link], $field:ident) => {};
    (@get $this:ident, $feature:ident, [$($marker:ident)?], $field:ident) => {
        if $feature == stringify!($field) {
            return Some($crate::model::FeatureValue::to_value(&$this.$field));
        }
    };

    (@set $this:ident, $feature:ident, $value:ident, [internal], $field:ident, $fty:ty) => {};
    (@set $this:ident, $feature:ident, $value:ident, [link], $field:ident, $fty:ty) => {};
    (@set $this:ident, $feature:ident, $value:ident, [$($marker:ident)?], $field:ident, $fty:ty) => {
        if $feature == stringify!($field) {
            $this.$field = <$fty as $crate::model::FeatureValue>::from_value($value)
                .map_err(|e| e.in_feature(stringify!($field)))?;
            return Ok(());
        }
    };

    (@descriptor [internal], $field:ident, $fty:ty, [$($target:literal)?]) => { None };
    (@descriptor [link], $field:ident, $fty:ty, [$($target:literal)?]) => { None };
    (@descriptor [derived], $field:ident, $fty:ty, [$($target:literal)?]) => {
        Some($crate::model::FeatureDescriptor::of::<$fty>(stringify!($field)) $(.with_target($target))? .derived())
    };
    (@descriptor [], $field:ident, $fty:ty, [$($target:literal)?]) => {
        Some($crate::model::FeatureDescriptor::of::<$fty>(stringify!($field)) $(.with_target($target))?)
    };

    (@init $values:ident, [internal], $field:ident, $fty:ty) => {
        ::std::default::Default::default()
    };
    (@init $values:ident, [link], $field:ident, $fty:ty) => {
        ::std::default::Default::default()
    };
    (@init $values:ident, [derived], $field:ident, $fty:ty) => {
        match $values.shift_remove(stringify!($field)) {
            Some(value) => <$fty as $crate::model::FeatureValue>::from_value(value)
                .map_err(|e| e.in_feature(stringify!($field)))?,
            None => ::std::default::Default::default(),
        }
    };
    (@init $values:ident, [], $field:ident, $fty:ty) => {
        <$fty as $crate::model::FeatureValue>::from_value(
            $values
                .shift_remove(stringify!($field))
                .unwrap_or($crate::model::Value::Null),
        )
        .map_err(|e| e.in_feature(stringify!($field)))?
    };
}

/// Declares an enumeration usable as an attribute type.
///
/// Literals are identified by their variant names.
#[macro_export]
macro_rules! node_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $type_name:literal {
            $($variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $crate::model::NodeEnum for $name {
            const ENUMERATION: &'static str = $type_name;
            const LITERALS: &'static [&'static str] = &[$(stringify!($variant)),+];

            fn literal(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }

            fn from_literal(literal: &str) -> ::std::option::Option<Self> {
                $(
                    if literal == stringify!($variant) {
                        return Some(Self::$variant);
                    }
                )+
                None
            }
        }

        impl $crate::model::AttributeScalar for $name {
            const VALUE_TYPE: $crate::model::ValueType = $crate::model::ValueType::Enum($type_name);

            fn to_scalar(&self) -> $crate::model::Value {
                $crate::model::Value::Enum($crate::model::EnumLiteral::new(
                    $type_name,
                    $crate::model::NodeEnum::literal(self),
                ))
            }

            fn from_scalar(
                value: $crate::model::Value,
            ) -> ::std::result::Result<Self, $crate::model::ValueError> {
                let literal = match value {
                    $crate::model::Value::Enum(e) => e.literal,
                    $crate::model::Value::String(s) => s,
                    other => return Err($crate::model::ValueError::mismatch("enum", &other)),
                };
                <Self as $crate::model::NodeEnum>::from_literal(&literal).ok_or(
                    $crate::model::ValueError::UnknownLiteral {
                        enumeration: $type_name.to_string(),
                        literal,
                    },
                )
            }
        }

        $crate::__singular_feature_value!($name);
    };
}
