//! IPC server: accepts one connection per client process, dispatches each
//! `Request` to the profile service named by the packet's domain byte, and
//! fans out `Event`s to every connection subscribed to that profile.

use std::io::{BufReader, BufWriter};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;

use log::{info, warn};

use bthost_core::error::BtError;
use bthost_core::instance::InstanceManager;
use bthost_core::profiles::a2dp::A2dpService;
use bthost_core::profiles::advertiser::AdvertiserService;
use bthost_core::profiles::gattc::GattClientService;
use bthost_core::profiles::gatts::GattServerService;
use bthost_core::profiles::hfp_ag::HfpAgService;
use bthost_core::profiles::hfp_hf::HfpHfService;
use bthost_core::profiles::hid::HidService;
use bthost_core::profiles::pan::PanService;
use bthost_core::profiles::scanner::ScannerService;
use bthost_core::profiles::spp::SppService;
use bthost_core::sal::Stack;

use bthost_types::addr::BdAddr;
use bthost_types::packet::{
    EventBody, InstanceId, Request, RequestOp, Response, ResponseErr, ResponseOk, ServerMessage,
};
use bthost_types::profile::ProfileId;

use crate::framing::{read_message, write_message};

type StackFactory = Arc<dyn Fn() -> Box<dyn Stack> + Send + Sync>;

fn boxed_factory(fac: StackFactory) -> Box<dyn Fn() -> Box<dyn Stack> + Send> {
    Box::new(move || fac())
}

/// Every profile service the host runs, aggregated behind one lock so a
/// connection's handler thread can dispatch a request without knowing which
/// profile it targets ahead of time.
pub struct Services {
    pub instances: InstanceManager,
    pub a2dp_sink: A2dpService,
    pub a2dp_source: A2dpService,
    pub hfp_ag: HfpAgService,
    pub hfp_hf: HfpHfService,
    pub pan: PanService,
    pub hid: HidService,
    pub spp: SppService,
    pub scanner: ScannerService,
    pub advertiser: AdvertiserService,
    pub gattc: GattClientService,
    pub gatts: GattServerService,
}

impl Services {
    pub fn new(local_addr: BdAddr, stack_factory: StackFactory) -> Self {
        Self {
            instances: InstanceManager::new(),
            a2dp_sink: A2dpService::new(boxed_factory(stack_factory.clone())),
            a2dp_source: A2dpService::new(boxed_factory(stack_factory.clone())),
            hfp_ag: HfpAgService::new(boxed_factory(stack_factory.clone())),
            hfp_hf: HfpHfService::new(boxed_factory(stack_factory.clone())),
            pan: PanService::new(local_addr),
            hid: HidService::new(),
            spp: SppService::default(),
            scanner: ScannerService::default(),
            advertiser: AdvertiserService::new(),
            gattc: GattClientService::new(),
            gatts: GattServerService::new(),
        }
    }
}

fn into_response_err(e: BtError) -> ResponseErr {
    match e {
        BtError::Parameter(s) => ResponseErr::Parameter(s),
        BtError::NotFound => ResponseErr::NotFound,
        BtError::NotEnabled => ResponseErr::NotEnabled,
        BtError::Busy => ResponseErr::Busy,
        BtError::Timeout => ResponseErr::Timeout,
        BtError::Ipc(s) => ResponseErr::Ipc(s),
        BtError::Stack(s) => ResponseErr::Stack(s),
        BtError::NotSupported => ResponseErr::NotSupported,
    }
}

/// A live connection's write half, shared between the handler thread (for
/// replies) and every profile subscription the connection holds (for
/// fanned-out events), guarded by a plain mutex since writes are rare and
/// never nested.
struct ConnWriter {
    stream: Mutex<BufWriter<UnixStream>>,
}

impl ConnWriter {
    fn send(&self, msg: &ServerMessage) {
        let mut w = self.stream.lock().unwrap();
        if let Err(e) = write_message(&mut *w, msg) {
            warn!("failed to write to client: {e}");
        }
    }
}

/// Route a single request to its profile's service, returning the
/// `ResponseOk` or the explicit error to report back — every branch of this
/// match must end in a value, so an unrecognized profile/op pairing falls
/// through to `NotSupported` rather than silently reusing a stale result.
fn dispatch(
    services: &mut Services,
    instances_conn: &mut Option<InstanceId>,
    req: &Request,
    writer: &Arc<ConnWriter>,
) -> Result<ResponseOk, ResponseErr> {
    if let RequestOp::Register { name } = &req.op {
        let id = services.instances.register(name.clone());
        *instances_conn = Some(id);
        return Ok(ResponseOk::Registered { instance: id });
    }

    let instance = req.instance.ok_or(ResponseErr::Parameter("missing instance".into()))?;

    match &req.op {
        RequestOp::Register { .. } => unreachable!(),

        RequestOp::Unregister => {
            services.instances.unregister(instance);
            Ok(ResponseOk::Unit)
        }

        RequestOp::Connect { addr } => connect(services, req.profile, instance, *addr),
        RequestOp::Disconnect { addr } => disconnect(services, req.profile, *addr),

        RequestOp::StreamStart { addr } => match req.profile {
            ProfileId::A2dpSink => services.a2dp_sink.start_stream(*addr).map(|_| ResponseOk::Unit).map_err(into_response_err),
            ProfileId::A2dpSource => services.a2dp_source.start_stream(*addr).map(|_| ResponseOk::Unit).map_err(into_response_err),
            _ => Err(ResponseErr::NotSupported),
        },

        RequestOp::StreamSuspend { addr } => match req.profile {
            ProfileId::A2dpSink => services
                .a2dp_sink
                .dispatch(*addr, &bthost_types::event::A2dpEvent::StreamSuspendReq)
                .map(|_| ResponseOk::Unit)
                .map_err(into_response_err),
            ProfileId::A2dpSource => services
                .a2dp_source
                .dispatch(*addr, &bthost_types::event::A2dpEvent::StreamSuspendReq)
                .map(|_| ResponseOk::Unit)
                .map_err(into_response_err),
            _ => Err(ResponseErr::NotSupported),
        },

        RequestOp::StartDiscovery => match req.profile {
            ProfileId::Scanner => {
                services.scanner.start_scan();
                Ok(ResponseOk::Unit)
            }
            _ => Err(ResponseErr::NotSupported),
        },

        RequestOp::StopDiscovery => match req.profile {
            ProfileId::Scanner => {
                services.scanner.stop_scan();
                Ok(ResponseOk::Unit)
            }
            _ => Err(ResponseErr::NotSupported),
        },

        RequestOp::Subscribe => subscribe(services, req.profile, instance, writer),
        RequestOp::Unsubscribe => unsubscribe(services, req.profile, instance),
    }
}

fn connect(services: &mut Services, profile: ProfileId, instance: InstanceId, addr: BdAddr) -> Result<ResponseOk, ResponseErr> {
    let result = match profile {
        ProfileId::A2dpSink => services.a2dp_sink.connect(addr),
        ProfileId::A2dpSource => services.a2dp_source.connect(addr),
        ProfileId::HfpAg => services.hfp_ag.connect(addr),
        ProfileId::HfpHf => services.hfp_hf.connect(addr),
        ProfileId::Pan => services.pan.connect(addr),
        ProfileId::Hid => services.hid.connect(addr),
        ProfileId::Spp => {
            services.spp.connect(addr);
            Ok(())
        }
        ProfileId::Gattc => services.gattc.create_connect(instance, addr),
        _ => return Err(ResponseErr::NotSupported),
    };
    result.map(|_| ResponseOk::Unit).map_err(into_response_err)
}

fn disconnect(services: &mut Services, profile: ProfileId, addr: BdAddr) -> Result<ResponseOk, ResponseErr> {
    match profile {
        ProfileId::A2dpSink => services.a2dp_sink.disconnect(addr).map_err(into_response_err)?,
        ProfileId::A2dpSource => services.a2dp_source.disconnect(addr).map_err(into_response_err)?,
        ProfileId::HfpAg => services
            .hfp_ag
            .dispatch(addr, 0, &bthost_types::event::HfpEvent::DisconnectReq)
            .map_err(into_response_err)?,
        ProfileId::HfpHf => services.hfp_hf.dispatch(addr, &bthost_types::event::HfpEvent::DisconnectReq).map_err(into_response_err)?,
        ProfileId::Pan => services.pan.disconnect(addr),
        ProfileId::Hid => services.hid.disconnect(addr),
        ProfileId::Spp => services.spp.disconnect(addr),
        _ => return Err(ResponseErr::NotSupported),
    }
    Ok(ResponseOk::Unit)
}

fn subscribe(services: &Services, profile: ProfileId, instance: InstanceId, writer: &Arc<ConnWriter>) -> Result<ResponseOk, ResponseErr> {
    let forward = {
        let writer = writer.clone();
        move |addr: BdAddr, body: &EventBody| {
            writer.send(&ServerMessage::Event(bthost_types::packet::Event { instance, profile, body: body.clone() }));
        }
    };
    let id = match profile {
        ProfileId::A2dpSink => services.a2dp_sink.subscribe(Arc::new(forward)),
        ProfileId::A2dpSource => services.a2dp_source.subscribe(Arc::new(forward)),
        ProfileId::HfpAg => services.hfp_ag.subscribe(Arc::new(forward)),
        _ => return Err(ResponseErr::NotSupported),
    }
    .map_err(into_response_err)?;
    Ok(ResponseOk::AppId(bthost_types::packet::AppId(id.raw())))
}

fn unsubscribe(services: &mut Services, profile: ProfileId, instance: InstanceId) -> Result<ResponseOk, ResponseErr> {
    let sub = services
        .instances
        .get(instance)
        .and_then(|i| i.subscription(profile))
        .ok_or(ResponseErr::NotFound)?;
    match profile {
        ProfileId::A2dpSink => services.a2dp_sink.unsubscribe(sub),
        ProfileId::A2dpSource => services.a2dp_source.unsubscribe(sub),
        ProfileId::HfpAg => services.hfp_ag.unsubscribe(sub),
        _ => return Err(ResponseErr::NotSupported),
    }
    Ok(ResponseOk::Unit)
}

fn handle_connection(stream: UnixStream, services: Arc<Mutex<Services>>) {
    let reader_stream = match stream.try_clone() {
        Ok(s) => s,
        Err(e) => {
            warn!("failed to clone client stream: {e}");
            return;
        }
    };
    let mut reader = BufReader::new(reader_stream);
    let writer = Arc::new(ConnWriter { stream: Mutex::new(BufWriter::new(stream)) });
    let mut instance: Option<InstanceId> = None;

    loop {
        let req: Request = match read_message(&mut reader) {
            Ok(r) => r,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => {
                warn!("client read error: {e}");
                break;
            }
        };
        let seq = req.seq;
        let result = {
            let mut guard = services.lock().unwrap();
            dispatch(&mut guard, &mut instance, &req, &writer)
        };
        writer.send(&ServerMessage::Response(Response { seq, result }));
    }

    if let Some(id) = instance {
        services.lock().unwrap().instances.unregister(id);
    }
}

/// Accepts connections on a Unix domain socket, spawning one handler thread
/// per client.
pub struct IpcServer {
    services: Arc<Mutex<Services>>,
}

impl IpcServer {
    pub fn new(services: Services) -> Self {
        Self { services: Arc::new(Mutex::new(services)) }
    }

    pub fn serve(&self, socket_path: &Path) -> std::io::Result<()> {
        if socket_path.exists() {
            std::fs::remove_file(socket_path)?;
        }
        let listener = UnixListener::bind(socket_path)?;
        info!("listening on {}", socket_path.display());
        for conn in listener.incoming() {
            let stream = match conn {
                Ok(s) => s,
                Err(e) => {
                    warn!("accept error: {e}");
                    continue;
                }
            };
            let services = self.services.clone();
            thread::spawn(move || handle_connection(stream, services));
        }
        Ok(())
    }
}
