//! JNI bindings for PDFium page text.
//!
//! Backs the two `external` functions of
//! `com.onyx.android.pdf.PdfiumNativeTextBridge`. Neither entry point throws:
//! failures are logged and come back as `null` or rotation 0.

mod marshal;

use std::ffi::c_void;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::ptr;

use jni::JNIEnv;
use jni::objects::JClass;
use jni::sys::{JNI_VERSION_1_6, JavaVM, jint, jlong, jobject};
use lazy_static::lazy_static;
use tracing::error;
use tracing_subscriber::EnvFilter;

use pdftext_core::bridge::DEFAULT_ROTATION;
use pdftext_core::{DynamicSource, ExtractedPage, LOG_TARGET, LibrarySource, LoaderConfig, TextBridge};

pub use marshal::{MarshalError, RESULT_CLASS, RESULT_CONSTRUCTOR_SIGNATURE, to_java_page};

lazy_static! {
    static ref BRIDGE: TextBridge<DynamicSource> =
        TextBridge::new(DynamicSource::new(LoaderConfig::default().with_env_overrides()));
}

/// Install logging when the JVM loads the library.
#[unsafe(no_mangle)]
pub extern "system" fn JNI_OnLoad(_vm: *mut JavaVM, _reserved: *mut c_void) -> jint {
    init_logging();
    JNI_VERSION_1_6
}

/// `PdfiumNativeTextBridge.nativeExtractPageText(pagePointer: Long): PdfiumNativeTextPage?`
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_onyx_android_pdf_PdfiumNativeTextBridge_nativeExtractPageText<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    page_ptr: jlong,
) -> jobject {
    guarded("extracting page text", ptr::null_mut(), || {
        let Some(page) = page_text(&*BRIDGE, page_ptr) else {
            return ptr::null_mut();
        };

        match to_java_page(&mut env, &page) {
            Ok(object) => object.into_raw(),
            Err(e) => {
                error!(target: LOG_TARGET, "{}", e);
                marshal::clear_pending_exception(&mut env);
                ptr::null_mut()
            }
        }
    })
}

/// `PdfiumNativeTextBridge.nativeGetPageRotation(pagePointer: Long): Int`
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_onyx_android_pdf_PdfiumNativeTextBridge_nativeGetPageRotation<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
    page_ptr: jlong,
) -> jint {
    guarded("reading page rotation", DEFAULT_ROTATION, || {
        page_rotation(&*BRIDGE, page_ptr)
    })
}

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

// Logcat is the only sink that survives on a device; stdout goes nowhere.
#[cfg(target_os = "android")]
fn init_logging() {
    use tracing_subscriber::prelude::*;

    let _ = tracing_subscriber::registry()
        .with(log_filter())
        .with(paranoid_android::layer(LOG_TARGET))
        .try_init();
}

#[cfg(not(target_os = "android"))]
fn init_logging() {
    // A subscriber installed by the host process takes precedence.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run an entry point body; a panic must not unwind into the JVM.
fn guarded<T>(operation: &str, fallback: T, body: impl FnOnce() -> T) -> T {
    catch_unwind(AssertUnwindSafe(body)).unwrap_or_else(|_| {
        error!(target: LOG_TARGET, "panic while {}", operation);
        fallback
    })
}

fn page_text<S: LibrarySource>(bridge: &TextBridge<S>, page_ptr: jlong) -> Option<ExtractedPage> {
    // SAFETY: the Kotlin side only passes FPDF_PAGE pointers obtained from
    // the PDFium instance loaded in this process, or 0.
    unsafe { bridge.extract_page_text(page_ptr) }
}

fn page_rotation<S: LibrarySource>(bridge: &TextBridge<S>, page_ptr: jlong) -> jint {
    // SAFETY: as in `page_text`.
    unsafe { bridge.page_rotation(page_ptr) }
}
