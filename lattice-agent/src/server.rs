use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tonic::transport::Server;
use tonic::{Request, Response};

use crate::{basebackup, conf, controldata, host, make_segment, remove_dir, start_segment, status, validate};
use lattice_core::config::ServiceConfig;
use lattice_core::error::{AppError, AppErrorExt, RpcResult};
use lattice_core::idl;
use lattice_core::sys::SharedSystem;

/// Application server.
pub struct AppServer {
    /// The replicated service configuration.
    config: Arc<ServiceConfig>,
    /// Host system capabilities.
    sys: SharedSystem,
    /// When this agent process came up.
    started: Instant,

    /// A channel used for triggering graceful shutdown.
    shutdown: broadcast::Sender<()>,
}

impl AppServer {
    /// Create a new instance.
    pub fn new(config: Arc<ServiceConfig>, sys: SharedSystem, shutdown: broadcast::Sender<()>) -> Self {
        Self {
            config,
            sys,
            started: Instant::now(),
            shutdown,
        }
    }

    /// Spawn this controller which also creates the agent gRPC server.
    pub async fn spawn(self) -> Result<JoinHandle<()>> {
        let addr = format!("0.0.0.0:{}", self.config.agent_port).parse().context("failed to parse listener address")?;
        let tls = self.config.credentials.load_server_config().await?;
        let (shutdown, mut shutdown_rx) = (self.shutdown.clone(), self.shutdown.subscribe());
        let service = idl::AgentServer::new(self);
        let fut = Server::builder()
            .tls_config(tls)
            .context("error applying TLS config to agent gRPC server")?
            .add_service(service)
            .serve_with_shutdown(addr, async move {
                let _res = shutdown_rx.recv().await;
            });
        Ok(tokio::spawn(async move {
            if let Err(err) = fut.await {
                tracing::error!(error = ?err, "error from agent gRPC server");
            }
            let _res = shutdown.send(());
        }))
    }
}

#[tonic::async_trait]
impl idl::Agent for AppServer {
    /// Validate this host's environment for the given segment layout.
    async fn validate_host_env(&self, request: Request<idl::ValidateHostEnvRequest>) -> RpcResult<Response<idl::ValidateHostEnvReply>> {
        let req = request.into_inner();
        let messages = validate::validate_host_env(self.sys.as_ref(), &self.config.gp_home, &req).await.map_err(AppError::grpc)?;
        Ok(Response::new(idl::ValidateHostEnvReply { messages }))
    }

    /// Initialize one segment data directory on this host.
    async fn make_segment(&self, request: Request<idl::MakeSegmentRequest>) -> RpcResult<Response<idl::MakeSegmentReply>> {
        let req = request.into_inner();
        make_segment::make_segment(self.sys.as_ref(), &self.config.gp_home, &req).await.map_err(AppError::grpc)?;
        Ok(Response::new(idl::MakeSegmentReply {}))
    }

    /// Start one local segment via pg_ctl.
    async fn start_segment(&self, request: Request<idl::StartSegmentRequest>) -> RpcResult<Response<idl::StartSegmentReply>> {
        let req = request.into_inner();
        start_segment::start_segment(&self.config.gp_home, &req).await.map_err(AppError::grpc)?;
        Ok(Response::new(idl::StartSegmentReply {}))
    }

    /// Stop this agent process.
    async fn stop(&self, _request: Request<idl::StopAgentRequest>) -> RpcResult<Response<idl::StopAgentReply>> {
        tracing::info!("received stop command, attempting graceful shutdown");
        let _res = self.shutdown.send(());
        Ok(Response::new(idl::StopAgentReply {}))
    }

    /// Report this agent's liveness info.
    async fn status(&self, _request: Request<idl::StatusAgentRequest>) -> RpcResult<Response<idl::StatusAgentReply>> {
        Ok(Response::new(status::status_reply(self.started)))
    }

    /// Return this host's canonical name.
    async fn get_host_name(&self, _request: Request<idl::GetHostNameRequest>) -> RpcResult<Response<idl::GetHostNameReply>> {
        let hostname = host::get_host_name(self.sys.as_ref()).map_err(AppError::grpc)?;
        Ok(Response::new(idl::GetHostNameReply { hostname }))
    }

    /// Return this host's non-loopback interface addresses in CIDR form.
    async fn get_interface_addrs(&self, _request: Request<idl::GetInterfaceAddrsRequest>) -> RpcResult<Response<idl::GetInterfaceAddrsReply>> {
        let addrs = host::get_interface_addrs(self.sys.as_ref()).map_err(AppError::grpc)?;
        Ok(Response::new(idl::GetInterfaceAddrsReply { addrs }))
    }

    /// Run a base backup of a remote primary into a local mirror directory.
    async fn pg_basebackup(&self, request: Request<idl::PgBasebackupRequest>) -> RpcResult<Response<idl::PgBasebackupReply>> {
        let req = request.into_inner();
        basebackup::pg_basebackup(self.sys.as_ref(), &self.config.gp_home, &self.config.log_dir, &req)
            .await
            .map_err(AppError::grpc)?;
        Ok(Response::new(idl::PgBasebackupReply {}))
    }

    /// Return fields parsed from pg_controldata output.
    async fn pg_control_data(&self, request: Request<idl::PgControlDataRequest>) -> RpcResult<Response<idl::PgControlDataReply>> {
        let req = request.into_inner();
        let result = controldata::pg_control_data(&self.config.gp_home, &req).await.map_err(AppError::grpc)?;
        Ok(Response::new(idl::PgControlDataReply { result }))
    }

    /// Rewrite settings in a local postgresql.conf.
    async fn update_pg_conf(&self, request: Request<idl::UpdatePgConfRequest>) -> RpcResult<Response<idl::UpdatePgConfReply>> {
        let req = request.into_inner();
        conf::update_pg_conf(&req).map_err(AppError::grpc)?;
        Ok(Response::new(idl::UpdatePgConfReply {}))
    }

    /// Append access entries to a local pg_hba.conf and reload.
    async fn update_pg_hba_conf(&self, request: Request<idl::UpdatePgHbaConfRequest>) -> RpcResult<Response<idl::UpdatePgHbaConfReply>> {
        let req = request.into_inner();
        conf::update_pg_hba_conf(self.sys.as_ref(), &self.config.gp_home, &req).await.map_err(AppError::grpc)?;
        Ok(Response::new(idl::UpdatePgHbaConfReply {}))
    }

    /// Remove a local data directory; used by cluster cleanup.
    async fn remove_directory(&self, request: Request<idl::RemoveDirectoryRequest>) -> RpcResult<Response<idl::RemoveDirectoryReply>> {
        let req = request.into_inner();
        remove_dir::remove_directory(&req.data_directory).await.map_err(AppError::grpc)?;
        Ok(Response::new(idl::RemoveDirectoryReply {}))
    }
}
