//! Real-Time Fan-Out Layer
//!
//! 三条角色频道 (kitchen / waiter / inventory)，每条是一个 broadcast
//! 通道；WebSocket 客户端按角色订阅。推送尽力而为：没有订阅者或通道
//! 积压溢出都只记日志，绝不反压业务路径。消息按租户打了 restaurant_id，
//! 客户端连接时绑定自己的门店，跨租户消息在转发循环里被过滤掉。

pub mod ws;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 256;

/// Role channels a client can attach to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Kitchen,
    Waiter,
    Inventory,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kitchen => "kitchen",
            Self::Waiter => "waiter",
            Self::Inventory => "inventory",
        }
    }
}

/// One push frame as sent over the wire
#[derive(Debug, Clone, Serialize)]
pub struct PushMessage {
    /// Wire event name, e.g. `new_order`, `table_update`, `low_stock`
    pub event: String,
    /// Tenant the frame belongs to. Connections are tenant-bound already;
    /// this rides along so clients can cross-check the frames they get.
    pub restaurant_id: i64,
    pub data: Value,
}

/// Fan-out registry over the three role channels; cheap to clone
#[derive(Clone)]
pub struct FanOutRegistry {
    kitchen: broadcast::Sender<PushMessage>,
    waiter: broadcast::Sender<PushMessage>,
    inventory: broadcast::Sender<PushMessage>,
}

impl FanOutRegistry {
    pub fn new() -> Self {
        let (kitchen, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (waiter, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (inventory, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            kitchen,
            waiter,
            inventory,
        }
    }

    pub fn subscribe(&self, channel: Channel) -> broadcast::Receiver<PushMessage> {
        self.sender(channel).subscribe()
    }

    /// Best-effort push to one channel. A send error only means nobody is
    /// listening right now.
    pub fn push(&self, channel: Channel, restaurant_id: i64, event: &str, data: Value) {
        let message = PushMessage {
            event: event.to_string(),
            restaurant_id,
            data,
        };
        match self.sender(channel).send(message) {
            Ok(receivers) => {
                tracing::debug!(channel = channel.as_str(), event, receivers, "pushed");
            }
            Err(_) => {
                tracing::debug!(channel = channel.as_str(), event, "no subscribers, dropped");
            }
        }
    }

    /// Table status changes concern every role; duplicate to all channels.
    pub fn broadcast_table_update(&self, restaurant_id: i64, data: Value) {
        for channel in [Channel::Kitchen, Channel::Waiter, Channel::Inventory] {
            self.push(channel, restaurant_id, "table_update", data.clone());
        }
    }

    fn sender(&self, channel: Channel) -> &broadcast::Sender<PushMessage> {
        match channel {
            Channel::Kitchen => &self.kitchen,
            Channel::Waiter => &self.waiter,
            Channel::Inventory => &self.inventory,
        }
    }
}

impl Default for FanOutRegistry {
    fn default() -> Self {
        Self::new()
    }
}
