//! Conversion of an [`ExtractedPage`] into a `PdfiumNativeTextPage`.

use jni::JNIEnv;
use jni::objects::{JFloatArray, JIntArray, JObject, JValue};
use jni::sys::jsize;
use thiserror::Error;

use pdftext_core::ExtractedPage;

/// JVM class constructed for every successful extraction.
pub const RESULT_CLASS: &str = "com/onyx/android/pdf/PdfiumNativeTextPage";

/// `PdfiumNativeTextPage(codePoints: IntArray, boxes: FloatArray)`.
pub const RESULT_CONSTRUCTOR_SIGNATURE: &str = "([I[F)V";

/// Failures while building the managed result.
#[derive(Error, Debug)]
pub enum MarshalError {
    #[error("Failed to find {0} class")]
    ClassNotFound(String, #[source] jni::errors::Error),

    #[error("Failed to find {0} constructor")]
    ConstructorNotFound(String, #[source] jni::errors::Error),

    #[error("array of {0} elements exceeds the JNI size limit")]
    ArrayTooLarge(usize),

    #[error("JNI call failed: {0}")]
    Jni(#[from] jni::errors::Error),
}

/// Build a `PdfiumNativeTextPage` holding copies of both arrays.
///
/// Either the whole object is built or an error is returned; no partially
/// filled object escapes. An empty page still produces an object.
pub fn to_java_page<'local>(
    env: &mut JNIEnv<'local>,
    page: &ExtractedPage,
) -> Result<JObject<'local>, MarshalError> {
    new_page_object(env, RESULT_CLASS, page)
}

fn new_page_object<'local>(
    env: &mut JNIEnv<'local>,
    class_name: &str,
    page: &ExtractedPage,
) -> Result<JObject<'local>, MarshalError> {
    let class = env
        .find_class(class_name)
        .map_err(|e| MarshalError::ClassNotFound(class_name.to_string(), e))?;
    env.get_method_id(&class, "<init>", RESULT_CONSTRUCTOR_SIGNATURE)
        .map_err(|e| MarshalError::ConstructorNotFound(class_name.to_string(), e))?;

    let (code_points, boxes) = new_arrays(env, page)?;

    let object = env.new_object(
        &class,
        RESULT_CONSTRUCTOR_SIGNATURE,
        &[JValue::from(&code_points), JValue::from(&boxes)],
    )?;
    Ok(object)
}

/// `int[]` and `float[]` sized exactly to the page's two sequences.
fn new_arrays<'local>(
    env: &mut JNIEnv<'local>,
    page: &ExtractedPage,
) -> Result<(JIntArray<'local>, JFloatArray<'local>), MarshalError> {
    let code_points = env.new_int_array(jsize_of(page.code_points().len())?)?;
    if !page.code_points().is_empty() {
        env.set_int_array_region(&code_points, 0, page.code_points())?;
    }

    let boxes = env.new_float_array(jsize_of(page.boxes().len())?)?;
    if !page.boxes().is_empty() {
        env.set_float_array_region(&boxes, 0, page.boxes())?;
    }

    Ok((code_points, boxes))
}

/// Clear any exception a failed JNI call left pending, so nothing is
/// thrown into the caller.
pub(crate) fn clear_pending_exception(env: &mut JNIEnv<'_>) {
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_clear();
    }
}

fn jsize_of(len: usize) -> Result<jsize, MarshalError> {
    jsize::try_from(len).map_err(|_| MarshalError::ArrayTooLarge(len))
}
