//! 请求调度器
//!
//! 四种模式共享同一个执行器（`http_client::HttpClient::send_request`）：
//! 同步、按句柄轮询的异步、按通知管道的异步、批量。句柄表用
//! `dashmap::DashMap` 实现——这个 crate 本身就是边界的最终实现，没有额外
//! 的宿主语言胶水层需要另一套表，用并发 map 已经是最终形态而不是占位。

use crate::boundary::{execute_request_message, RequestMessage, ResponseMessage};
use crate::error::EngineError;
use crate::http_client::{
    HttpClient, HttpClientConfig, HttpClientError, HttpRequest, SseConnection, SseEvent,
    WebSocketConnection, WebSocketMessage, WebSocketOpcode,
};
use dashmap::DashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

enum AsyncSlot {
    Pending,
    Ready(ResponseMessage),
}

fn requests() -> &'static DashMap<u64, AsyncSlot> {
    static TABLE: OnceLock<DashMap<u64, AsyncSlot>> = OnceLock::new();
    TABLE.get_or_init(DashMap::new)
}

fn sockets() -> &'static DashMap<u64, Mutex<WebSocketConnection>> {
    static TABLE: OnceLock<DashMap<u64, Mutex<WebSocketConnection>>> = OnceLock::new();
    TABLE.get_or_init(DashMap::new)
}

fn streams() -> &'static DashMap<u64, Mutex<SseConnection>> {
    static TABLE: OnceLock<DashMap<u64, Mutex<SseConnection>>> = OnceLock::new();
    TABLE.get_or_init(DashMap::new)
}

fn next_handle() -> u64 {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

fn to_engine_error(e: HttpClientError) -> EngineError {
    EngineError::ConnectionError(e.to_string())
}

/// 同步跑一次请求；请求处理过程中的 panic 在这里被恢复为 `ProtocolError`，
/// 绝不让调用方看到一次 unwind。
pub fn execute_one(
    client: &HttpClient,
    request: &HttpRequest,
) -> Result<crate::http_client::HttpResponse, EngineError> {
    match catch_unwind(AssertUnwindSafe(|| client.send_request(request))) {
        Ok(Ok(resp)) => Ok(resp),
        Ok(Err(e)) => Err(EngineError::ProtocolError(e.to_string())),
        Err(_) => Err(EngineError::ProtocolError("request handler panicked".to_string())),
    }
}

/// 异步提交：开一个后台线程执行，句柄立即可用于轮询
pub fn submit(msg: RequestMessage) -> u64 {
    let handle = next_handle();
    requests().insert(handle, AsyncSlot::Pending);
    let request_id = request_id_for(&msg, handle);
    std::thread::spawn(move || {
        let response = execute_request_message(&msg, request_id);
        if let Some(mut slot) = requests().get_mut(&handle) {
            *slot = AsyncSlot::Ready(response);
        }
    });
    handle
}

/// 请求消息本身就畸形（解码失败）时，直接登记一个已就绪的失败句柄，
/// 保持"句柄总能被 poll/take"这条契约
pub fn submit_failed(err: EngineError) -> u64 {
    let handle = next_handle();
    requests().insert(handle, AsyncSlot::Ready(ResponseMessage::from_error(String::new(), &err)));
    handle
}

/// 与 `submit` 相同，额外在完成时向 `fd` 写入一个字节，让宿主免去轮询
#[cfg(unix)]
pub fn submit_with_notify(msg: RequestMessage, fd: std::os::unix::io::RawFd) -> u64 {
    let handle = next_handle();
    requests().insert(handle, AsyncSlot::Pending);
    let request_id = request_id_for(&msg, handle);
    std::thread::spawn(move || {
        let response = execute_request_message(&msg, request_id);
        if let Some(mut slot) = requests().get_mut(&handle) {
            *slot = AsyncSlot::Ready(response);
        }
        notify(fd);
    });
    handle
}

#[cfg(unix)]
fn notify(fd: std::os::unix::io::RawFd) {
    use std::io::Write;
    use std::os::unix::io::FromRawFd;

    // fd 的所有权仍归调用方；写完一个字节立刻 forget，避免替调用方关掉它
    // 还要用的文件描述符
    let mut file = unsafe { std::fs::File::from_raw_fd(fd) };
    let _ = file.write_all(&[1u8]);
    std::mem::forget(file);
}

fn request_id_for(msg: &RequestMessage, handle: u64) -> String {
    if msg.request_id.is_empty() {
        format!("async-{}", handle)
    } else {
        msg.request_id.clone()
    }
}

/// 取走一个已完成句柄的结果并释放表项；未就绪或句柄不存在都返回 `None`。
/// 对同一个句柄的第二次调用总是返回 `None`。
pub fn take_result(handle: u64) -> Option<ResponseMessage> {
    let is_ready = matches!(requests().get(&handle)?.value(), AsyncSlot::Ready(_));
    if !is_ready {
        return None;
    }
    requests().remove(&handle).and_then(|(_, slot)| match slot {
        AsyncSlot::Ready(resp) => Some(resp),
        AsyncSlot::Pending => None,
    })
}

/// 放弃一个句柄而不读取结果（调用方取消等待时的清理路径）
pub fn forget(handle: u64) {
    requests().remove(&handle);
}

/// 并发跑一批请求，按声明顺序收集响应；单个请求的失败只体现在它自己的
/// 响应里（status=0），绝不让整批失败。
pub fn run_batch(batch: Vec<RequestMessage>) -> Vec<ResponseMessage> {
    std::thread::scope(|scope| {
        let handles: Vec<_> = batch
            .iter()
            .enumerate()
            .map(|(i, msg)| {
                let request_id = request_id_for(msg, i as u64);
                scope.spawn(move || execute_request_message(msg, request_id))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| {
                h.join().unwrap_or_else(|_| {
                    ResponseMessage::from_error(
                        String::new(),
                        &EngineError::ProtocolError("batch item panicked".to_string()),
                    )
                })
            })
            .collect()
    })
}

pub fn ws_connect(request: &HttpRequest, config: &HttpClientConfig) -> Result<u64, EngineError> {
    let conn = WebSocketConnection::connect(request, config).map_err(to_engine_error)?;
    let handle = next_handle();
    sockets().insert(handle, Mutex::new(conn));
    Ok(handle)
}

pub fn ws_send(handle: u64, opcode: WebSocketOpcode, payload: &[u8]) -> Result<(), EngineError> {
    let entry = sockets()
        .get(&handle)
        .ok_or_else(|| EngineError::ProtocolError("unknown websocket handle".to_string()))?;
    let mut conn = entry
        .lock()
        .map_err(|_| EngineError::ProtocolError("websocket handle lock poisoned".to_string()))?;
    match opcode {
        WebSocketOpcode::Text => conn
            .send_text(&String::from_utf8_lossy(payload))
            .map_err(to_engine_error),
        WebSocketOpcode::Binary => conn.send_binary(payload).map_err(to_engine_error),
        WebSocketOpcode::Ping => conn.ping(payload).map_err(to_engine_error),
        WebSocketOpcode::Pong => conn.pong(payload).map_err(to_engine_error),
        WebSocketOpcode::Close => conn
            .close(1000, &String::from_utf8_lossy(payload))
            .map_err(to_engine_error),
        WebSocketOpcode::Continuation => {
            Err(EngineError::ProtocolError("cannot send a bare continuation frame".to_string()))
        }
    }
}

pub fn ws_receive(handle: u64) -> Result<WebSocketMessage, EngineError> {
    let entry = sockets()
        .get(&handle)
        .ok_or_else(|| EngineError::ProtocolError("unknown websocket handle".to_string()))?;
    let mut conn = entry
        .lock()
        .map_err(|_| EngineError::ProtocolError("websocket handle lock poisoned".to_string()))?;
    conn.receive().map_err(to_engine_error)
}

pub fn ws_close(handle: u64) {
    sockets().remove(&handle);
}

pub fn sse_connect(request: &HttpRequest, config: &HttpClientConfig) -> Result<u64, EngineError> {
    let conn = SseConnection::connect(request, config).map_err(to_engine_error)?;
    let handle = next_handle();
    streams().insert(handle, Mutex::new(conn));
    Ok(handle)
}

pub fn sse_next_event(handle: u64) -> Result<Option<SseEvent>, EngineError> {
    let entry = streams()
        .get(&handle)
        .ok_or_else(|| EngineError::ProtocolError("unknown sse handle".to_string()))?;
    let mut conn = entry
        .lock()
        .map_err(|_| EngineError::ProtocolError("sse handle lock poisoned".to_string()))?;
    conn.next_event().map_err(to_engine_error)
}

pub fn sse_close(handle: u64) {
    streams().remove(&handle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_failed_handle_is_immediately_ready() {
        let handle = submit_failed(EngineError::Cancelled);
        let result = take_result(handle).unwrap();
        assert_eq!(result.status, 0);
    }

    #[test]
    fn take_result_is_single_shot() {
        let handle = submit_failed(EngineError::Cancelled);
        assert!(take_result(handle).is_some());
        assert!(take_result(handle).is_none());
    }

    #[test]
    fn forget_drops_a_pending_handle() {
        let handle = next_handle();
        requests().insert(handle, AsyncSlot::Pending);
        forget(handle);
        assert!(take_result(handle).is_none());
    }

    #[test]
    fn run_batch_preserves_declaration_order_and_isolates_failures() {
        let batch = vec![
            RequestMessage { request_id: "a".to_string(), url: String::new(), ..Default::default() },
            RequestMessage { request_id: "b".to_string(), url: "not a url".to_string(), ..Default::default() },
        ];
        let results = run_batch(batch);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].request_id, "a");
        assert_eq!(results[1].request_id, "b");
        assert_eq!(results[0].status, 0);
        assert_eq!(results[1].status, 0);
    }
}
