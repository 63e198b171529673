//! `Arbitrary`/`quickcheck::Arbitrary` impls for [`crate::Value`] and
//! [`crate::SetObject`], in the style of the teacher's own
//! `src/arbitrary.rs`: each trait gets its own feature-gated inner
//! module so the two optional dependencies never both need to be
//! present at once.

#[cfg(feature = "arbitrary")]
mod impl_arbitrary {
    use crate::{SetConfig, SetObject, Value};
    use arbitrary::{Arbitrary, Result, Unstructured};

    impl<'a> Arbitrary<'a> for Value {
        fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self> {
            Vec::<u8>::arbitrary(u).map(Value::new)
        }
    }

    impl<'a> Arbitrary<'a> for SetObject {
        fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self> {
            let values = Vec::<Value>::arbitrary(u)?;
            let config = SetConfig::default();
            let mut set = SetObject::empty();
            for v in values {
                set.add(v, &config);
            }
            Ok(set)
        }
    }
}

#[cfg(feature = "quickcheck")]
mod impl_quickcheck {
    use crate::{SetConfig, SetObject, Value};
    use quickcheck::{Arbitrary, Gen};

    impl Arbitrary for Value {
        fn arbitrary(g: &mut Gen) -> Self {
            Value::new(Vec::<u8>::arbitrary(g))
        }

        fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
            Box::new(self.as_bytes().to_vec().shrink().map(Value::new))
        }
    }

    impl Arbitrary for SetObject {
        fn arbitrary(g: &mut Gen) -> Self {
            let values = Vec::<Value>::arbitrary(g);
            let config = SetConfig::default();
            let mut set = SetObject::empty();
            for v in values {
                set.add(v, &config);
            }
            set
        }
    }
}
