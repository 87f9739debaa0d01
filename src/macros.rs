//! Macros for generating per-datatype capability names and building shapes.

/// Declares the named reader, writer and iterator traits for each element
/// type, each blanket-implemented for the matching generic capability.
///
/// # Examples
/// ```ignore
/// datatype_family! {
///     f32 => Float32Reader, Float32Writer, Float32Iter;
/// }
/// ```
#[macro_export]
macro_rules! datatype_family {
    ($($ty:ty => $reader:ident, $writer:ident, $iter:ident);+ $(;)?) => {
        $(
            #[doc = concat!("Reader over `", stringify!($ty), "` elements.")]
            pub trait $reader: $crate::storage::Reader<$ty> {}

            impl<R: $crate::storage::Reader<$ty> + ?Sized> $reader for R {}

            #[doc = concat!("Writer over `", stringify!($ty), "` elements.")]
            pub trait $writer: $crate::storage::Writer<$ty> {}

            impl<W: $crate::storage::Writer<$ty> + ?Sized> $writer for W {}

            #[doc = concat!("Iterator over `", stringify!($ty), "` elements.")]
            pub trait $iter: $crate::storage::ElementIter<$ty> {}

            impl<I: $crate::storage::ElementIter<$ty> + ?Sized> $iter for I {}
        )+
    };
}

/// Builds a [`Shape`](crate::dimension::Shape) from a list of entries.
///
/// Plain expressions become fixed extents; `@expr` marks an indexed
/// dimension backed by a `Reader<i64>`.
///
/// # Examples
/// ```
/// use tensorust_index::shape;
///
/// let s = shape![3, @vec![10i64, 11, 12, 13]];
/// assert_eq!(s.extents(), vec![3, 4]);
/// ```
#[macro_export]
macro_rules! shape {
    () => {
        $crate::dimension::Shape::scalar()
    };
    ($($entry:tt)+) => {
        $crate::dimension::Shape::new($crate::__shape_entries!([] $($entry)+))
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __shape_entries {
    ([$($done:expr),*]) => {
        vec![$($done),*]
    };
    ([$($done:expr),*] @ $reader:expr $(, $($rest:tt)*)?) => {
        $crate::__shape_entries!(
            [$($done,)* $crate::dimension::ShapeEntry::indexed($reader)] $($($rest)*)?
        )
    };
    ([$($done:expr),*] $extent:expr $(, $($rest:tt)*)?) => {
        $crate::__shape_entries!(
            [$($done,)* $crate::dimension::ShapeEntry::Extent($extent)] $($($rest)*)?
        )
    };
}
