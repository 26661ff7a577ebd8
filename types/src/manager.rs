use bumpalo::Bump;
use core::cell::RefCell;
use hashbrown::{DefaultHashBuilder, HashMap};

use crate::ty::{Ctor, Field, Type};

/// Arena-backed factory for interned type descriptors.
///
/// All descriptors produced by one manager live in its arena and are
/// interned: building the same descriptor twice returns the same
/// `&'a Type<'a>` pointer.
pub struct TypeManager<'a> {
    // Arena holding all descriptors from this manager.
    arena: &'a Bump,
    interned_strs: RefCell<HashMap<&'a str, &'a str, DefaultHashBuilder, &'a Bump>>,
    interned: RefCell<HashMap<Type<'a>, &'a Type<'a>, DefaultHashBuilder, &'a Bump>>,
}

impl<'a> TypeManager<'a> {
    pub fn new(arena: &'a Bump) -> &'a Self {
        arena.alloc(Self {
            arena,
            interned_strs: RefCell::new(HashMap::new_in(arena)),
            interned: RefCell::new(HashMap::new_in(arena)),
        })
    }

    fn intern_str(&self, s: &str) -> &'a str {
        if let Some(&interned_str) = self.interned_strs.borrow().get(s) {
            return interned_str;
        }
        let arena_str = self.arena.alloc_str(s);
        self.interned_strs.borrow_mut().insert(arena_str, arena_str);
        arena_str
    }

    fn intern(&self, ty: Type<'a>) -> &'a Type<'a> {
        if let Some(&interned_ty) = self.interned.borrow().get(&ty) {
            return interned_ty;
        }
        let arena_ty = self.arena.alloc(ty.clone());
        self.interned.borrow_mut().insert(ty, arena_ty);
        arena_ty
    }

    /// A primitive descriptor with the given wire name.
    pub fn prim(&self, name: &str) -> &'a Type<'a> {
        let name = self.intern_str(name);
        self.intern(Type::Prim(name))
    }

    /// A type-level natural number (array length node).
    pub fn size(&self, n: usize) -> &'a Type<'a> {
        self.intern(Type::Size(n))
    }

    /// A fixed-length array with an explicit length node.
    ///
    /// `len` is usually a [`Type::Size`]; passing anything else builds
    /// a descriptor that consumers will reject as having an invalid
    /// length, which is occasionally what a test wants.
    pub fn fixed_arr(&self, len: &'a Type<'a>, elem: &'a Type<'a>) -> &'a Type<'a> {
        self.intern(Type::FixedArr { len, elem })
    }

    /// Convenience for the common case: `[elem; n]`.
    pub fn array_of(&self, elem: &'a Type<'a>, n: usize) -> &'a Type<'a> {
        self.fixed_arr(self.size(n), elem)
    }

    /// A record descriptor from `(name, byte offset, type)` triples in
    /// declaration order. Order is preserved; it is part of the type.
    pub fn strukt(&self, fields: &[(&str, usize, &'a Type<'a>)]) -> &'a Type<'a> {
        let fields = self
            .arena
            .alloc_slice_fill_iter(fields.iter().map(|&(name, offset, ty)| Field {
                name: self.intern_str(name),
                offset,
                ty,
            }));
        self.intern(Type::Struct(fields))
    }

    /// A variant descriptor from `(name, tag, payload)` triples in
    /// declaration order.
    pub fn variant(&self, ctors: &[(&str, u32, &'a Type<'a>)]) -> &'a Type<'a> {
        let ctors = self
            .arena
            .alloc_slice_fill_iter(ctors.iter().map(|&(name, tag, payload)| Ctor {
                name: self.intern_str(name),
                tag,
                payload,
            }));
        self.intern(Type::Variant(ctors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning() {
        let bump = Bump::new();
        let manager = TypeManager::new(&bump);

        let int_ty = manager.prim("int");
        let double_ty = manager.prim("double");

        // Calling the factory methods again returns the same pointer.
        assert!(core::ptr::eq(int_ty, manager.prim("int")));
        assert!(core::ptr::eq(double_ty, manager.prim("double")));
        assert!(!core::ptr::eq(int_ty, double_ty));
    }

    #[test]
    fn test_interning_compound() {
        let bump = Bump::new();
        let manager = TypeManager::new(&bump);

        let arr = manager.array_of(manager.prim("int"), 3);
        assert!(core::ptr::eq(arr, manager.array_of(manager.prim("int"), 3)));
        assert!(!core::ptr::eq(arr, manager.array_of(manager.prim("int"), 4)));

        let rec = manager.strukt(&[("x", 0, manager.prim("int"))]);
        assert!(core::ptr::eq(
            rec,
            manager.strukt(&[("x", 0, manager.prim("int"))])
        ));
    }

    #[test]
    fn test_field_order_is_significant() {
        let bump = Bump::new();
        let manager = TypeManager::new(&bump);
        let int = manager.prim("int");

        let ab = manager.strukt(&[("a", 0, int), ("b", 4, int)]);
        let ba = manager.strukt(&[("b", 4, int), ("a", 0, int)]);
        assert!(!core::ptr::eq(ab, ba));
    }
}
