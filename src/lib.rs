/*!
Evaluates and round-trips the four PDF function types: sampled
(`FunctionType 0`), exponential interpolation (`FunctionType 2`),
stitching (`FunctionType 3`), and PostScript calculator
(`FunctionType 4`).

This crate does not parse PDF files. It reads functions out of, and
writes functions into, a small object-model seam ([`Object`],
[`Resolve`], [`ObjectWriter`]) that a host PDF library implements
against its own document graph.

# Example

```
use pdf_function::{CycleChecker, Function, Limits, Object, ReadError, Resolve, Dict, Version};

struct NoIndirection;

impl Resolve for NoIndirection {
    fn resolve(&self, obj: &Object) -> Result<Object, ReadError> {
        Ok(obj.clone())
    }
    fn version(&self) -> Version {
        Version(1, 7)
    }
}

let mut dict = Dict::new();
dict.insert("FunctionType", Object::Integer(2));
dict.insert("Domain", Object::Array(vec![Object::Real(0.0), Object::Real(1.0)]));
dict.insert("C0", Object::Array(vec![Object::Real(0.0)]));
dict.insert("C1", Object::Array(vec![Object::Real(1.0)]));
dict.insert("N", Object::Real(1.0));

let limits = Limits::default();
let mut checker = CycleChecker::new();
let f = Function::read(&NoIndirection, &Object::Dictionary(dict), &limits, &mut checker).unwrap();
assert_eq!(f.apply(&[0.25], &limits), vec![0.25]);
```
*/

#![deny(missing_docs)]

mod error;
mod function;
mod limits;
mod math;
mod object;
mod render;
mod repair;
mod type0;
mod type2;
mod type3;
mod type4;
mod value;
mod vm;

pub use error::{InvalidFunction, ReadError, Version, VmError};
pub use function::Function;
pub use limits::Limits;
pub use object::{check_version, decode_stream, CycleChecker, Dict, ObjRef, Object, ObjectWriter, Resolve};
pub use render::{render_indirect, write_object};
pub use type0::Type0Function;
pub use type2::ExponentialFunction;
pub use type3::StitchingFunction;
pub use type4::PostScriptFunction;
pub use value::Value;
