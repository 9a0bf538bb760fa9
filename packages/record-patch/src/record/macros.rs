/// Declares a patchable record type.
///
/// Emits the struct itself plus its [`Record`](crate::Record),
/// [`PatchTarget`](crate::PatchTarget) and [`FieldValue`](crate::FieldValue)
/// implementations. The struct must derive `Default` and `Clone`.
///
/// Field annotations:
/// - `field: Ty => "name"` uses `name` as the external name
/// - `field: Ty => skip` excludes the field from patching
/// - no annotation folds the identifier (`date_of_birth` stays
///   `date_of_birth`, `userID` becomes `user_id`)
///
/// Only `pub` fields are patchable.
///
/// ```
/// record_patch::patch_record! {
///     #[derive(Debug, Clone, Default, PartialEq)]
///     pub struct Account {
///         pub name: String,
///         pub balance: i64 => "bal",
///         pub password_hash: String => skip,
///     }
/// }
/// ```
#[macro_export]
macro_rules! patch_record {
    (@name) => {
        $crate::record::ExternalName::Default
    };
    (@name skip) => {
        $crate::record::ExternalName::Default
    };
    (@name $rename:literal) => {
        $crate::record::ExternalName::Explicit($rename)
    };
    (@inclusion skip) => {
        $crate::record::Inclusion::Excluded
    };
    (@inclusion $($other:tt)?) => {
        $crate::record::Inclusion::Included
    };
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fattr:meta])*
                $fvis:vis $field:ident : $ty:ty $( => $opt:tt )?
            ),* $(,)?
        }
    ) => {
        $(#[$attr])*
        $vis struct $name {
            $(
                $(#[$fattr])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::record::Record for $name {
            fn type_name(&self) -> &'static str {
                stringify!($name)
            }

            fn shape(&self) -> $crate::record::Shape {
                $crate::record::Shape::Struct
            }

            fn describe(&self) -> ::core::option::Option<::std::vec::Vec<$crate::record::FieldSpec>> {
                ::core::option::Option::Some($crate::record::describe(
                    <$name as $crate::record::PatchTarget>::accessors(),
                ))
            }

            fn field_value(&self, name: &str) -> ::core::option::Option<$crate::Value> {
                $crate::record::read_field(self, name)
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }
        }

        impl $crate::record::PatchTarget for $name {
            fn accessors() -> &'static [$crate::record::FieldAccessor<$name>] {
                const ACCESSORS: &[$crate::record::FieldAccessor<$name>] = &[
                    $(
                        $crate::record::FieldAccessor {
                            ident: stringify!($field),
                            field_type: <$ty as $crate::value::FieldValue>::field_type,
                            name: $crate::patch_record!(@name $($opt)?),
                            inclusion: $crate::patch_record!(@inclusion $($opt)?),
                            visibility: $crate::record::Visibility::from_token(stringify!($fvis)),
                            get: |record: &$name| {
                                $crate::value::FieldValue::to_value(&record.$field)
                            },
                            set: |record: &mut $name,
                                  value: &$crate::Value,
                                  policy: $crate::value::CoercionPolicy| {
                                match <$ty as $crate::value::FieldValue>::from_value(value, policy) {
                                    ::core::option::Option::Some(converted) => {
                                        record.$field = converted;
                                        true
                                    }
                                    ::core::option::Option::None => false,
                                }
                            },
                        },
                    )*
                ];
                ACCESSORS
            }
        }

        impl $crate::value::FieldValue for $name {
            fn field_type() -> $crate::value::FieldType {
                $crate::value::FieldType::Record(stringify!($name))
            }

            fn to_value(&self) -> $crate::Value {
                $crate::record::record_to_value(self)
            }

            fn from_value(
                value: &$crate::Value,
                policy: $crate::value::CoercionPolicy,
            ) -> ::core::option::Option<Self> {
                $crate::record::record_from_value(value, policy)
            }
        }
    };
}
