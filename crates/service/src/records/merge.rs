/// Shallow "copy non-empty fields" merge.
///
/// A field of the patch overwrites the corresponding field of `self` only when
/// it is non-empty. Nested records are replaced whole, never merged recursively.
pub trait MergeNonEmpty {
    fn is_empty_value(&self) -> bool;

    fn merge_non_empty(&mut self, patch: Self);
}

impl MergeNonEmpty for String {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }

    fn merge_non_empty(&mut self, patch: Self) {
        if !patch.is_empty() {
            *self = patch;
        }
    }
}

impl<T> MergeNonEmpty for Option<T> {
    fn is_empty_value(&self) -> bool {
        self.is_none()
    }

    fn merge_non_empty(&mut self, patch: Self) {
        if patch.is_some() {
            *self = patch;
        }
    }
}

/// Implement [`MergeNonEmpty`] for a struct from its field list.
///
/// The struct is empty when every listed field is empty; merging replaces each
/// listed field whose patch value is non-empty.
#[macro_export]
macro_rules! merge_fields {
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        impl $crate::records::MergeNonEmpty for $ty {
            fn is_empty_value(&self) -> bool {
                true $(&& $crate::records::MergeNonEmpty::is_empty_value(&self.$field))+
            }

            fn merge_non_empty(&mut self, patch: Self) {
                $(
                    if !$crate::records::MergeNonEmpty::is_empty_value(&patch.$field) {
                        self.$field = patch.$field;
                    }
                )+
            }
        }
    };
}
