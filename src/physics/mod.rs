//! 物理桥接
//!
//! 物理模拟跑在独立 worker 线程上，与场景图之间只通过消息传递
//! 交换数据，两边永远不共享内存：
//!
//! - 出站：节点被 [`Scene::set_position`] / [`Scene::set_rotation`]
//!   修改时，变换回调把 `(id, 位姿)` 发给 worker
//! - 入站：worker 算完一步后send回同构的更新消息，
//!   [`PhysicsBridge::apply_updates`] 在帧边界统一回写场景
//!
//! 回写直接改 transform 字段而不是走 setter，影子状态脏检查
//! 照样能发现改动，同时避免了"回写触发回调再发回 worker"的回环。
//! 节点按稳定 id 寻址，晚到的更新（节点已移除）直接丢弃。

pub mod smoothing;

pub use smoothing::{DEFAULT_SMOOTHING_FACTOR, SmoothTarget, Smoothing};

use flume::{Receiver, Sender};
use glam::{Quat, Vec3};

use crate::errors::{Result, TrellisError};
use crate::scene::{NodeId, NodeKey, Scene};

/// 一条位姿消息，两个方向共用同一结构
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformUpdate {
    pub id: NodeId,
    pub position: Vec3,
    pub rotation: Quat,
}

/// 发往物理 worker 的命令
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhysicsCommand {
    /// 在模拟里登记一个刚体
    Spawn {
        id: NodeId,
        position: Vec3,
        rotation: Quat,
        scale: Vec3,
        mass: f32,
    },
    /// 场景侧主动挪动了节点，模拟须跟随
    Move(TransformUpdate),
}

/// 场景侧的桥端
pub struct PhysicsBridge {
    commands: Sender<PhysicsCommand>,
    updates: Receiver<TransformUpdate>,
    applied_count: u64,
}

/// worker 侧的桥端，字段直接暴露给模拟循环用
pub struct PhysicsEndpoint {
    pub commands: Receiver<PhysicsCommand>,
    pub updates: Sender<TransformUpdate>,
}

/// 建一对互联的桥端，场景侧一个、worker 侧一个
#[must_use]
pub fn channel() -> (PhysicsBridge, PhysicsEndpoint) {
    let (command_tx, command_rx) = flume::unbounded();
    let (update_tx, update_rx) = flume::unbounded();
    (
        PhysicsBridge {
            commands: command_tx,
            updates: update_rx,
            applied_count: 0,
        },
        PhysicsEndpoint {
            commands: command_rx,
            updates: update_tx,
        },
    )
}

impl PhysicsBridge {
    /// 把节点纳入物理模拟
    ///
    /// 向 worker 发送 Spawn，并在节点上安装变换回调，此后每次
    /// setter 修改都会转成 Move 命令发出去。
    pub fn track(&self, scene: &mut Scene, key: NodeKey, mass: f32) -> Result<()> {
        let Some(node) = scene.get_node(key) else {
            return Err(TrellisError::NodeNotFound {
                context: "physics track",
            });
        };
        let spawn = PhysicsCommand::Spawn {
            id: node.id(),
            position: node.transform.position,
            rotation: node.transform.rotation,
            scale: node.transform.scale,
            mass,
        };
        self.commands
            .send(spawn)
            .map_err(|_| TrellisError::PhysicsDisconnected)?;

        let sender = self.commands.clone();
        scene.set_transform_callback(
            key,
            Box::new(move |id, position, rotation| {
                // worker 掉线时回调无处上报，静默丢弃
                let _ = sender.send(PhysicsCommand::Move(TransformUpdate { id, position, rotation }));
            }),
        );
        Ok(())
    }

    /// 取消跟踪：卸掉变换回调，setter 不再通知 worker
    pub fn untrack(&self, scene: &mut Scene, key: NodeKey) {
        scene.clear_transform_callback(key);
    }

    /// 把积压的入站更新直接回写场景，返回本次回写条数
    ///
    /// 非阻塞，最多消费调用时刻已到达的消息。
    pub fn apply_updates(&mut self, scene: &mut Scene) -> usize {
        let mut applied = 0;
        for update in self.updates.try_iter() {
            let Some(key) = scene.node_by_id(update.id) else {
                continue;
            };
            if let Some(node) = scene.get_node_mut(key) {
                node.transform.position = update.position;
                node.transform.rotation = update.rotation;
                applied += 1;
            }
        }
        self.applied_count += applied as u64;
        applied
    }

    /// 把积压的入站更新转成平滑目标，由 [`Smoothing::tick`] 逐帧逼近
    pub fn apply_updates_smoothed(&mut self, smoothing: &mut Smoothing) -> usize {
        let mut queued = 0;
        for update in self.updates.try_iter() {
            smoothing.push_target(update.id, update.position, update.rotation);
            queued += 1;
        }
        queued
    }

    /// 历史累计回写条数（只计 [`apply_updates`](Self::apply_updates) 的直接路径）
    #[must_use]
    pub fn applied_count(&self) -> u64 {
        self.applied_count
    }

    /// worker 端是否已断开
    #[must_use]
    pub fn is_disconnected(&self) -> bool {
        self.commands.is_disconnected()
    }
}
