//! The A2DP profile service — owns one state machine per connected device
//! and fans stack/timer events out to subscribed clients.

use std::collections::HashMap;

use bthost_types::addr::BdAddr;
use bthost_types::event::A2dpEvent;
use bthost_types::packet::EventBody;

use crate::callbacks::{CallbackRegistry, SubscriberId};
use crate::error::{BtError, BtResult};
use crate::hsm::StateMachine;
use crate::sal::Stack;

use super::state_machine::{take_delayed_start, A2dpCtx, A2dpState};

type EventCallback = std::sync::Arc<dyn Fn(BdAddr, &EventBody) + Send + Sync>;

struct Device {
    sm: StateMachine<A2dpState>,
    ctx: A2dpCtx,
}

pub struct A2dpService {
    devices: HashMap<BdAddr, Device>,
    subscribers: CallbackRegistry<EventCallback>,
    stack_factory: Box<dyn Fn() -> Box<dyn Stack> + Send>,
}

impl A2dpService {
    pub fn new(stack_factory: Box<dyn Fn() -> Box<dyn Stack> + Send>) -> Self {
        Self { devices: HashMap::new(), subscribers: CallbackRegistry::new(), stack_factory }
    }

    pub fn subscribe(&self, callback: EventCallback) -> BtResult<SubscriberId> {
        self.subscribers.register(callback)
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        self.subscribers.unregister(id);
    }

    pub fn connect(&mut self, addr: BdAddr) -> BtResult<()> {
        if self.devices.contains_key(&addr) {
            return Err(BtError::Busy);
        }
        let mut ctx = A2dpCtx::new(addr, (self.stack_factory)());
        let sm = StateMachine::new(A2dpState::Idle, &mut ctx);
        self.devices.insert(addr, Device { sm, ctx });
        self.dispatch(addr, &A2dpEvent::ConnectReq)
    }

    pub fn start_stream(&mut self, addr: BdAddr) -> BtResult<()> {
        self.dispatch(addr, &A2dpEvent::StreamStartReq)
    }

    pub fn disconnect(&mut self, addr: BdAddr) -> BtResult<()> {
        self.dispatch(addr, &A2dpEvent::DisconnectReq)
    }

    /// Feed a stack or timer event into the device's state machine, running
    /// post-transition follow-ups (delayed-start replay, client fan-out).
    pub fn dispatch(&mut self, addr: BdAddr, event: &A2dpEvent) -> BtResult<()> {
        let transitioned = {
            let device = self.devices.get_mut(&addr).ok_or(BtError::NotFound)?;
            let transitioned = device.sm.dispatch(&mut device.ctx, event);

            if transitioned && *device.sm.current() == A2dpState::Open {
                if take_delayed_start(&mut device.ctx) {
                    let start_result = device.sm.dispatch(&mut device.ctx, &A2dpEvent::StreamStartReq);
                    let _ = start_result;
                }
            }

            transitioned
        };

        if transitioned {
            self.fan_out(addr, event);
        }

        let device = self.devices.get(&addr).ok_or(BtError::NotFound)?;
        if matches!(device.sm.current(), A2dpState::Idle) && device.sm.previous().is_some() {
            self.devices.remove(&addr);
        }

        Ok(())
    }

    fn fan_out(&self, addr: BdAddr, event: &A2dpEvent) {
        let body = match event {
            A2dpEvent::Connected => Some(EventBody::Connected { addr }),
            A2dpEvent::Disconnected => Some(EventBody::Disconnected { addr }),
            A2dpEvent::StreamStarted => Some(EventBody::StreamStarted { addr }),
            A2dpEvent::StreamSuspended => Some(EventBody::StreamSuspended { addr }),
            _ => None,
        };
        if let Some(body) = body {
            self.subscribers.for_each(|_, cb| cb(addr, &body));
        }
    }

    pub fn state_of(&self, addr: BdAddr) -> Option<&A2dpState> {
        self.devices.get(&addr).map(|d| d.sm.current())
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sal::MockStack;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn service() -> A2dpService {
        A2dpService::new(Box::new(|| Box::new(MockStack::new())))
    }

    #[test]
    fn connect_creates_device_in_opening_state() {
        let mut svc = service();
        let addr = BdAddr::new([1; 6]);
        svc.connect(addr).unwrap();
        assert_eq!(svc.state_of(addr), Some(&A2dpState::Opening));
    }

    #[test]
    fn second_connect_to_same_device_is_busy() {
        let mut svc = service();
        let addr = BdAddr::new([1; 6]);
        svc.connect(addr).unwrap();
        assert!(matches!(svc.connect(addr), Err(BtError::Busy)));
    }

    #[test]
    fn connected_event_fans_out_to_subscribers() {
        let mut svc = service();
        let addr = BdAddr::new([2; 6]);
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        svc.subscribe(Arc::new(move |_addr, body| {
            if matches!(body, EventBody::Connected { .. }) {
                c.fetch_add(1, Ordering::SeqCst);
            }
        }))
        .unwrap();

        svc.connect(addr).unwrap();
        svc.dispatch(addr, &A2dpEvent::Connected).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn disconnect_event_reaching_idle_removes_device() {
        let mut svc = service();
        let addr = BdAddr::new([3; 6]);
        svc.connect(addr).unwrap();
        svc.dispatch(addr, &A2dpEvent::Connected).unwrap();
        svc.dispatch(addr, &A2dpEvent::Disconnected).unwrap();
        assert_eq!(svc.device_count(), 0);
    }

    #[test]
    fn dispatch_on_unknown_device_is_not_found() {
        let mut svc = service();
        assert!(matches!(svc.dispatch(BdAddr::ANY, &A2dpEvent::Connected), Err(BtError::NotFound)));
    }
}
