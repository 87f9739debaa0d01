//! Typed element access and index translation for strided tensor views.
//!
//! The crate is organized bottom-up:
//!
//! - [`datatype`]: the element datatype tags.
//! - [`storage`]: the `Reader`, `Writer` and `ElementIter` capabilities and
//!   their adapters over flat buffers.
//! - [`dimension`]: shapes, strides, validated view metadata and the
//!   [`IndexTranslator`] mapping logical indices to physical ones.
//! - [`view`]: [`TensorView`], N-D reads and writes through a translator.
//! - [`set`]: the `LongSet` capability.
//!
//! ```
//! use tensorust_index::{shape, TensorReader, TensorView, ViewMetadata};
//!
//! let data: Vec<i64> = (0..22).collect();
//! let meta = ViewMetadata::builder(shape![3, @vec![10i64, 11, 12, 13]])
//!     .strides(vec![4, 1])
//!     .build()
//!     .unwrap();
//! let view = TensorView::new(meta, &data).unwrap();
//! assert_eq!(view.read2d(1, 1).unwrap(), 15);
//! ```

mod macros;

pub mod datatype;
pub mod dimension;
pub mod error;
pub mod set;
pub mod storage;
pub mod view;

pub use datatype::{Datatype, Element, Object};
pub use dimension::{
    Dimension, IndexTranslator, Shape, ShapeEntry, Stride, ViewDescriptor, ViewMetadata,
    ViewMetadataBuilder,
};
pub use error::{Result, TensorustError};
pub use set::LongSet;
pub use storage::{Access, ElementIter, Reader, ReaderIter, Writer};
pub use view::{TensorReader, TensorView, TensorWriter};
