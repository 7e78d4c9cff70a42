use crate::{Category, TypeDesc};

impl TypeDesc {
    /// Whether a value described by `self` may be bound by a parameter described by `dest`
    ///
    /// Reproduces reference binding: a mutable lvalue reference only binds lvalues, an
    /// rvalue reference never binds an lvalue, references never drop qualifiers,
    /// indirection depth must match level by level, and the only implicit pointer
    /// conversion is to an owned untyped (`c_void`) pointer
    pub fn can_convert_to(&self, dest: &TypeDesc) -> bool {
        match dest.category() {
            Category::LvalueRef => {
                if !dest.referent_qualifiers().read_only
                    && self.category() != Category::LvalueRef
                {
                    return false;
                }
            }
            Category::RvalueRef => {
                if self.category() == Category::LvalueRef {
                    return false;
                }
            }
            // binding by value makes a copy
            Category::Owned => {}
        }

        if dest.category().is_reference() && !self.qualifiers().converts_to(dest.qualifiers()) {
            return false;
        }

        let (src_chain, dest_chain) = (self.pointer_chain(), dest.pointer_chain());
        if src_chain.len() != dest_chain.len() {
            return false;
        }
        if src_chain
            .iter()
            .zip(dest_chain)
            .any(|(src, dest)| !src.converts_to(*dest))
        {
            return false;
        }

        self.identity() == dest.identity()
            || (dest.category() == Category::Owned
                && !dest_chain.is_empty()
                && dest.identity().is_untyped())
    }
}
