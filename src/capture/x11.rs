use super::{CaptureError, FrameSize, FrameSource, RawFrame, ResolvedWindow};
use x11rb::errors::{ConnectionError, ReplyError};
use x11rb::protocol::xproto::{ConnectionExt as _, ImageFormat};
use x11rb::protocol::ErrorKind;
use x11rb::rust_connection::RustConnection;

const ALL_PLANES: u32 = u32::MAX;

/// Captures the child's window through a direct X11 connection.
pub struct X11FrameSource {
    display: Option<String>,
    conn: Option<RustConnection>,
}

impl X11FrameSource {
    /// `display` overrides `$DISPLAY` when set.
    pub fn new(display: Option<String>) -> Self {
        Self {
            display,
            conn: None,
        }
    }
}

impl FrameSource for X11FrameSource {
    fn resolve(&mut self, xid: u32) -> Result<ResolvedWindow, CaptureError> {
        let (conn, _screen) = x11rb::connect(self.display.as_deref())
            .map_err(|err| CaptureError::Connection(err.to_string()))?;
        let tree = conn
            .query_tree(xid)
            .map_err(connection_error)?
            .reply()
            .map_err(reply_error)?;
        let parent = (tree.parent != x11rb::NONE).then_some(tree.parent);
        self.conn = Some(conn);
        Ok(ResolvedWindow { xid, parent })
    }

    fn capture(&mut self, window: &ResolvedWindow, size: FrameSize) -> Result<RawFrame, CaptureError> {
        let conn = self
            .conn
            .as_ref()
            .ok_or_else(|| CaptureError::Connection("no open display connection".to_string()))?;
        let image = conn
            .get_image(
                ImageFormat::Z_PIXMAP,
                window.xid,
                0,
                0,
                size.width,
                size.height,
                ALL_PLANES,
            )
            .map_err(connection_error)?
            .reply()
            .map_err(reply_error)?;
        Ok(RawFrame {
            width: size.width,
            height: size.height,
            depth: image.depth,
            data: image.data,
        })
    }
}

fn connection_error(err: ConnectionError) -> CaptureError {
    CaptureError::Connection(err.to_string())
}

/// `BadMatch` on GetImage means the window is not viewable yet.
fn reply_error(err: ReplyError) -> CaptureError {
    match err {
        ReplyError::X11Error(x11) if x11.error_kind == ErrorKind::Match => CaptureError::NotReady,
        ReplyError::X11Error(x11) => CaptureError::Protocol(format!(
            "{:?} error (request {:?})",
            x11.error_kind, x11.request_name
        )),
        ReplyError::ConnectionError(err) => connection_error(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use x11rb::x11_utils::X11Error;

    fn x11_error(error_kind: ErrorKind) -> ReplyError {
        ReplyError::X11Error(X11Error {
            error_kind,
            error_code: 0,
            sequence: 1,
            bad_value: 0,
            minor_opcode: 0,
            major_opcode: 73,
            extension_name: None,
            request_name: Some("GetImage"),
        })
    }

    #[test]
    fn bad_match_means_window_not_ready() {
        assert_eq!(reply_error(x11_error(ErrorKind::Match)), CaptureError::NotReady);
    }

    #[test]
    fn other_x11_errors_are_protocol_failures() {
        match reply_error(x11_error(ErrorKind::Drawable)) {
            CaptureError::Protocol(msg) => {
                assert!(msg.contains("Drawable"));
                assert!(msg.contains("GetImage"));
            }
            other => panic!("expected protocol error, got {other:?}"),
        }
        assert!(!reply_error(x11_error(ErrorKind::Window)).is_not_ready());
    }

    #[test]
    fn connection_errors_keep_their_kind() {
        let err = reply_error(ReplyError::ConnectionError(ConnectionError::UnknownError));
        assert!(matches!(err, CaptureError::Connection(_)));
    }
}
