//! Internal helpers to interface with the c ffmpeg code

use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::path::Path;
use std::{cmp, ptr};

/// Backing data for a custom avio read callback
pub struct Stream {
    pub offset: usize,
    pub data: Vec<u8>,
}

pub unsafe extern "C" fn read_stream(ptr: *mut c_void, buf: *mut u8, size: c_int) -> c_int {
    let stream = &mut *(ptr as *mut Stream);
    let size = cmp::min(size.max(0) as usize, stream.data.len() - stream.offset);
    if size == 0 {
        return ffmpeg::AVERROR_EOF;
    }

    ptr::copy_nonoverlapping(stream.data.as_ptr().add(stream.offset), buf, size);
    stream.offset += size;

    size as c_int
}

pub fn path_to_raw(path: &Path) -> Option<CString> {
    CString::new(path.to_str()?).ok()
}

/// The human readable message ffmpeg associates with an error code
pub fn error_string(code: c_int) -> String {
    let mut buf = [0 as c_char; 256];
    unsafe {
        if ffmpeg::av_strerror(code, buf.as_mut_ptr(), buf.len()) < 0 {
            return format!("unknown error {code}");
        }
        CStr::from_ptr(buf.as_ptr()).to_string_lossy().into_owned()
    }
}
