#![forbid(unsafe_code)]

//! Platform seam for document-level listeners and page scrolling.
//!
//! A gesture that starts on a card keeps receiving events after the pointer
//! leaves the card, which in a browser means temporary listeners on the
//! document. [`InputHost`] is the narrow interface the gesture layer uses to
//! acquire and release those listeners and to suppress page scrolling.
//!
//! [`ListenerSet`] is the resource list for one gesture: everything attached
//! through it is detached together by a single [`ListenerSet::release`] call,
//! and releasing twice is harmless.
//!
//! [`HeadlessHost`] implements the trait in memory. Tests use it to assert that
//! no listener outlives its gesture; non-browser embedders can use it as-is.

/// Handle returned by [`InputHost::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Document-level listener categories a gesture may need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    MouseMove,
    MouseUp,
    TouchMove,
    TouchEnd,
    TouchCancel,
    /// Non-passive listener that blocks pinch-zoom while a touch drag is live.
    MultiTouchGuard,
}

impl ListenerKind {
    /// Listeners a mouse gesture needs until release.
    pub const MOUSE: &'static [ListenerKind] = &[ListenerKind::MouseMove, ListenerKind::MouseUp];

    /// Listeners a touch gesture needs until release.
    pub const TOUCH: &'static [ListenerKind] = &[
        ListenerKind::TouchMove,
        ListenerKind::TouchEnd,
        ListenerKind::TouchCancel,
        ListenerKind::MultiTouchGuard,
    ];

    /// DOM event name the listener is attached for.
    #[must_use]
    pub const fn event_name(self) -> &'static str {
        match self {
            Self::MouseMove => "mousemove",
            Self::MouseUp => "mouseup",
            Self::TouchMove => "touchmove",
            Self::TouchEnd => "touchend",
            Self::TouchCancel => "touchcancel",
            Self::MultiTouchGuard => "touchstart",
        }
    }
}

/// The platform side of gesture handling.
pub trait InputHost {
    /// Attach a document-level listener. The host routes matching native
    /// events back into the gesture layer until the listener is removed.
    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId;

    /// Detach a listener. Unknown or already-removed IDs are ignored.
    fn remove_listener(&mut self, id: ListenerId);

    /// Enable or disable page scrolling (e.g. `overflow: hidden` on the body).
    fn set_page_scroll(&mut self, enabled: bool);
}

/// Listeners acquired for one gesture, released together.
#[derive(Debug, Default)]
pub struct ListenerSet {
    ids: Vec<ListenerId>,
}

impl ListenerSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach each kind through `host` and remember the handles.
    pub fn attach(&mut self, host: &mut dyn InputHost, kinds: &[ListenerKind]) {
        self.ids.reserve(kinds.len());
        for &kind in kinds {
            self.ids.push(host.add_listener(kind));
        }
    }

    /// Detach everything this set holds. Returns how many listeners were
    /// released; a second call returns 0.
    pub fn release(&mut self, host: &mut dyn InputHost) -> usize {
        let released = self.ids.len();
        for id in self.ids.drain(..) {
            host.remove_listener(id);
        }
        released
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// One recorded call on a [`HeadlessHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCall {
    Add(ListenerId, ListenerKind),
    Remove(ListenerId),
    PageScroll(bool),
}

/// In-memory [`InputHost`] that tracks live listeners and scroll state.
#[derive(Debug)]
pub struct HeadlessHost {
    next_id: u64,
    active: Vec<(ListenerId, ListenerKind)>,
    page_scroll: bool,
    calls: Vec<HostCall>,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self {
            next_id: 1,
            active: Vec::new(),
            page_scroll: true,
            calls: Vec::new(),
        }
    }
}

impl HeadlessHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of listeners currently attached.
    #[must_use]
    pub fn active_listeners(&self) -> usize {
        self.active.len()
    }

    /// Whether a listener of `kind` is currently attached.
    #[must_use]
    pub fn has_listener(&self, kind: ListenerKind) -> bool {
        self.active.iter().any(|&(_, k)| k == kind)
    }

    /// Current page-scroll state (`true` = scrolling allowed).
    #[must_use]
    pub fn page_scroll_enabled(&self) -> bool {
        self.page_scroll
    }

    /// Every call received so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }
}

impl InputHost for HeadlessHost {
    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.active.push((id, kind));
        self.calls.push(HostCall::Add(id, kind));
        id
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.active.retain(|&(active, _)| active != id);
        self.calls.push(HostCall::Remove(id));
    }

    fn set_page_scroll(&mut self, enabled: bool) {
        self.page_scroll = enabled;
        self.calls.push(HostCall::PageScroll(enabled));
    }
}
