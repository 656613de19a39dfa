//! The low-level keyboard hook and its thread

use std::cell::{Cell, RefCell};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use compose_core::{
    FeedbackSink, HookAdapter, HookDecision, ModifierState, RawKeyEvent, Settings, SharedSequences,
};
use log::{error, info, warn};
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    GetAsyncKeyState, GetKeyState, VK_CAPITAL, VK_CONTROL, VK_MENU, VK_SHIFT,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, KillTimer, PeekMessageW, PostThreadMessageW,
    SetTimer, SetWindowsHookExW, TranslateMessage, UnhookWindowsHookEx, HC_ACTION,
    KBDLLHOOKSTRUCT, MSG, PM_NOREMOVE, WH_KEYBOARD_LL, WM_KEYDOWN, WM_KEYUP, WM_QUIT,
    WM_SYSKEYDOWN, WM_SYSKEYUP, WM_USER,
};

use crate::beep::BeepSink;
use crate::inject::{SendInputInjector, INJECTED_MARKER};
use crate::translate::LayoutTranslator;

type Adapter = HookAdapter<SendInputInjector, LayoutTranslator>;

thread_local! {
    // The hook procedure and the timer both run on the hook thread, so the
    // adapter never leaves it.
    static ADAPTER: RefCell<Option<Adapter>> = RefCell::new(None);
    static TIMER: Cell<usize> = Cell::new(0);
}

/// A running compose key service: the hook thread and its message loop
pub struct ComposeService {
    thread_id: u32,
    sequences: Arc<SharedSequences>,
    handle: Option<JoinHandle<()>>,
}

impl ComposeService {
    /// Starts the hook thread and waits until the hook is installed.
    ///
    /// `sequences` may be reloaded from any thread while the service runs.
    pub fn start(
        settings: &Settings,
        sequences: Arc<SharedSequences>,
        sinks: Vec<Box<dyn FeedbackSink>>,
    ) -> Result<Self> {
        settings.validate()?;
        let config = settings.engine_config();
        let beep = settings.beep_on_invalid;
        let shared = Arc::clone(&sequences);
        let (ready_tx, ready_rx) = mpsc::channel::<Result<u32>>();

        let handle = thread::Builder::new()
            .name("compose-hook".to_string())
            .spawn(move || {
                let mut adapter = HookAdapter::new(
                    config,
                    shared,
                    SendInputInjector::new(),
                    LayoutTranslator::new(),
                );
                if beep {
                    adapter.subscribe(Box::new(BeepSink));
                }
                for sink in sinks {
                    adapter.subscribe(sink);
                }
                ADAPTER.with(|cell| *cell.borrow_mut() = Some(adapter));
                run_hook_thread(ready_tx);
                ADAPTER.with(|cell| cell.borrow_mut().take());
            })
            .context("failed to spawn the hook thread")?;

        let thread_id = ready_rx
            .recv()
            .map_err(|_| anyhow!("hook thread exited during start-up"))??;
        info!("compose hook installed on thread {}", thread_id);

        Ok(Self {
            thread_id,
            sequences,
            handle: Some(handle),
        })
    }

    pub fn sequences(&self) -> &Arc<SharedSequences> {
        &self.sequences
    }

    /// Removes the hook and waits for its thread to finish
    pub fn stop(&mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        // SAFETY: posting to a thread we created
        unsafe { PostThreadMessageW(self.thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) }
            .context("failed to signal the hook thread")?;
        handle
            .join()
            .map_err(|_| anyhow!("hook thread panicked"))?;
        info!("compose hook removed");
        Ok(())
    }
}

impl Drop for ComposeService {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("failed to stop compose hook: {:#}", e);
        }
    }
}

fn run_hook_thread(ready: mpsc::Sender<Result<u32>>) {
    // SAFETY: standard hook thread set-up; the message queue is created by
    // PeekMessageW before anyone can post WM_QUIT to it
    unsafe {
        let mut msg = MSG::default();
        let _ = PeekMessageW(&mut msg, None, WM_USER, WM_USER, PM_NOREMOVE);

        let hook = match GetModuleHandleW(None)
            .and_then(|module| SetWindowsHookExW(WH_KEYBOARD_LL, Some(low_level_keyboard_proc), module, 0))
        {
            Ok(hook) => hook,
            Err(e) => {
                let _ = ready.send(Err(anyhow!("failed to install keyboard hook: {}", e)));
                return;
            }
        };
        let _ = ready.send(Ok(GetCurrentThreadId()));

        while GetMessageW(&mut msg, None, 0, 0).as_bool() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }

        if let Err(e) = UnhookWindowsHookEx(hook) {
            error!("failed to remove keyboard hook: {}", e);
        }
        cancel_timer();
    }
}

fn key_pressed(vk: u16) -> bool {
    // SAFETY: reads global key state only
    unsafe { GetAsyncKeyState(vk as i32) as u16 & 0x8000 != 0 }
}

fn current_modifiers() -> ModifierState {
    ModifierState {
        shift: key_pressed(VK_SHIFT.0),
        ctrl: key_pressed(VK_CONTROL.0),
        alt: key_pressed(VK_MENU.0),
        // SAFETY: reads global key state only
        caps_lock: unsafe { GetKeyState(VK_CAPITAL.0 as i32) } & 1 != 0,
    }
}

/// Arms the thread timer for the session deadline, or disarms it
fn schedule_timer(adapter: &Adapter) {
    match adapter.deadline() {
        Some(deadline) => {
            let delay = deadline.saturating_duration_since(Instant::now());
            let millis = delay.as_millis().clamp(1, u32::MAX as u128) as u32;
            // SAFETY: thread timers need no window; the id is kept so the
            // timer can be replaced
            let id = unsafe { SetTimer(HWND(0), TIMER.with(Cell::get), millis, Some(timer_proc)) };
            TIMER.with(|timer| timer.set(id));
        }
        None => cancel_timer(),
    }
}

fn cancel_timer() {
    let id = TIMER.with(|timer| timer.replace(0));
    if id != 0 {
        // SAFETY: the id came from SetTimer on this thread
        let _ = unsafe { KillTimer(HWND(0), id) };
    }
}

unsafe extern "system" fn timer_proc(_hwnd: HWND, _msg: u32, _id: usize, _time: u32) {
    let result = catch_unwind(AssertUnwindSafe(|| {
        ADAPTER.with(|cell| {
            if let Ok(mut guard) = cell.try_borrow_mut() {
                if let Some(adapter) = guard.as_mut() {
                    adapter.on_timer(Instant::now());
                    schedule_timer(adapter);
                }
            }
        })
    }));
    if let Err(e) = result {
        error!("Panic in compose timer: {:?}", e);
    }
}

unsafe extern "system" fn low_level_keyboard_proc(ncode: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    // Catch ALL panics to prevent the hook from being removed
    let result = catch_unwind(AssertUnwindSafe(|| {
        if ncode != HC_ACTION as i32 || lparam.0 == 0 {
            return HookDecision::PassThrough;
        }
        let is_down = match wparam.0 as u32 {
            WM_KEYDOWN | WM_SYSKEYDOWN => true,
            WM_KEYUP | WM_SYSKEYUP => false,
            _ => return HookDecision::PassThrough,
        };

        // SAFETY: lparam points to a KBDLLHOOKSTRUCT when ncode == HC_ACTION
        let kb = unsafe { &*(lparam.0 as *const KBDLLHOOKSTRUCT) };
        let event = RawKeyEvent {
            vk: kb.vkCode as u16,
            scan_code: kb.scanCode as u16,
            modifiers: current_modifiers(),
            is_down,
            is_injected: kb.dwExtraInfo == INJECTED_MARKER,
            timestamp: Instant::now(),
        };

        ADAPTER.with(|cell| match cell.try_borrow_mut() {
            Ok(mut guard) => match guard.as_mut() {
                Some(adapter) => {
                    let decision = adapter.on_key_event(&event);
                    schedule_timer(adapter);
                    decision
                }
                None => HookDecision::PassThrough,
            },
            // Re-entered while injecting: this can only be our own output
            Err(_) => HookDecision::PassThrough,
        })
    }));

    match result {
        Ok(HookDecision::Suppress) => LRESULT(1),
        Ok(HookDecision::PassThrough) => CallNextHookEx(None, ncode, wparam, lparam),
        Err(e) => {
            error!("CRITICAL: Panic in keyboard hook procedure: {:?}", e);
            CallNextHookEx(None, ncode, wparam, lparam)
        }
    }
}
