use std::pin::Pin;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use tokio_tungstenite::tungstenite::Message;

use crate::error::CoreError;

/// 入站文本消息流；流结束或产出错误都视为连接断开
pub type MessageStream = Pin<Box<dyn Stream<Item = Result<String, CoreError>> + Send>>;

/// 持久通道的传输层接口
#[async_trait]
pub trait ChannelTransport: Send + Sync {
    async fn connect(&self, url: &str) -> Result<MessageStream, CoreError>;
}

/// WebSocket 实现
pub struct WsTransport;

#[async_trait]
impl ChannelTransport for WsTransport {
    async fn connect(&self, url: &str) -> Result<MessageStream, CoreError> {
        let (stream, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| CoreError::Transport(e.to_string()))?;

        let stream = stream.filter_map(|message| async move {
            match message {
                Ok(Message::Text(text)) => Some(Ok(text.as_str().to_string())),
                // 心跳等控制帧不上抛
                Ok(_) => None,
                Err(e) => Some(Err(CoreError::Transport(e.to_string()))),
            }
        });
        Ok(Box::pin(stream))
    }
}
