use std::collections::BTreeSet;
use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Request, Response};

use crate::make_cluster;
use crate::mirrors;
use crate::stream::HubStream;
use lattice_core::config::ServiceConfig;
use lattice_core::error::{AppError, AppErrorExt, RpcResult};
use lattice_core::idl::{self, AgentClient};
use lattice_core::postgres::{run_utility, LatticeSsh};
use lattice_core::sys::{SharedSystem, SystemOps};

/// One dialed agent.
#[derive(Clone)]
pub struct Connection {
    pub hostname: String,
    pub client: AgentClient<Channel>,
}

/// The hub server.
///
/// Cheap to clone; all state lives behind the inner Arc so streaming
/// operations can run on their own tasks.
#[derive(Clone)]
pub struct Server {
    inner: Arc<ServerInner>,
}

struct ServerInner {
    config: Arc<ServiceConfig>,
    sys: SharedSystem,
    /// The agent connection pool; built once, cleared on StopAgents.
    conns: Mutex<Vec<Connection>>,
    /// A channel used for triggering graceful shutdown.
    shutdown: broadcast::Sender<()>,
}

impl Server {
    /// Create a new instance.
    pub fn new(config: Arc<ServiceConfig>, sys: SharedSystem, shutdown: broadcast::Sender<()>) -> Self {
        Self {
            inner: Arc::new(ServerInner {
                config,
                sys,
                conns: Mutex::new(Vec::new()),
                shutdown,
            }),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.inner.config
    }

    pub fn sys(&self) -> &dyn SystemOps {
        self.inner.sys.as_ref()
    }

    /// Spawn this controller which also creates the hub gRPC server.
    pub async fn spawn(&self) -> Result<JoinHandle<()>> {
        let addr = format!("0.0.0.0:{}", self.inner.config.hub_port).parse().context("failed to parse listener address")?;
        let tls = self.inner.config.credentials.load_server_config().await?;

        let (mut health_reporter, health_service) = tonic_health::server::health_reporter();
        health_reporter.set_serving::<idl::HubServer<Server>>().await;

        let service = idl::HubServer::new(self.clone());
        let (shutdown, mut shutdown_rx) = (self.inner.shutdown.clone(), self.inner.shutdown.subscribe());
        let fut = tonic::transport::Server::builder()
            .tls_config(tls)
            .context("error applying TLS config to hub gRPC server")?
            .add_service(health_service)
            .add_service(service)
            .serve_with_shutdown(addr, async move {
                let _res = shutdown_rx.recv().await;
            });
        Ok(tokio::spawn(async move {
            if let Err(err) = fut.await {
                tracing::error!(error = ?err, "error from hub gRPC server");
            }
            let _res = shutdown.send(());
        }))
    }

    /// Open one channel per configured host, reusing the pool across
    /// operations.
    pub async fn dial_all_agents(&self) -> Result<Vec<Connection>> {
        let mut conns = self.inner.conns.lock().await;
        if !conns.is_empty() {
            return Ok(conns.clone());
        }
        for host in &self.inner.config.hostnames {
            let client = self.dial_agent(host).await?;
            conns.push(Connection {
                hostname: host.clone(),
                client,
            });
        }
        Ok(conns.clone())
    }

    /// Dial a single agent by host name or address.
    pub async fn dial_agent(&self, host: &str) -> Result<AgentClient<Channel>> {
        let tls = self.inner.config.credentials.load_client_config(host).await?;
        let endpoint = Endpoint::from_shared(format!("https://{}:{}", host, self.inner.config.agent_port))
            .context("error building agent endpoint")?
            .tls_config(tls)
            .context("error applying TLS config to agent endpoint")?;
        let channel = endpoint.connect().await.with_context(|| format!("could not connect to agent on host {}", host))?;
        Ok(AgentClient::new(channel))
    }

    async fn clear_conns(&self) {
        self.inner.conns.lock().await.clear();
    }
}

/// Invoke `f` on every connection concurrently.
///
/// Per-host errors are prefixed with the originating hostname and all of
/// them are logged; the first one becomes the operation's result.
pub async fn execute_rpc<F, Fut>(conns: &[Connection], f: F) -> Result<()>
where
    F: Fn(Connection) -> Fut,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let mut tasks = Vec::with_capacity(conns.len());
    for conn in conns {
        tasks.push((conn.hostname.clone(), tokio::spawn(f(conn.clone()))));
    }

    let mut first_err = None;
    for (hostname, task) in tasks {
        let res = match task.await {
            Ok(res) => res,
            Err(err) => Err(anyhow!("task panicked: {}", err)),
        };
        if let Err(err) = res {
            let err = anyhow!("host: {}, {:#}", hostname, err);
            tracing::error!("{:#}", err);
            if first_err.is_none() {
                first_err = Some(err);
            }
        }
    }
    match first_err {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// The subset of connections serving the given hosts.
pub fn conns_for_hosts(conns: &[Connection], hostnames: &[String]) -> Vec<Connection> {
    conns.iter().filter(|conn| hostnames.contains(&conn.hostname)).cloned().collect()
}

fn start_agent_command(service_name: &str) -> String {
    if cfg!(target_os = "macos") {
        format!("launchctl start {}_agent", service_name)
    } else {
        format!("systemctl --user start {}_agent", service_name)
    }
}

#[tonic::async_trait]
impl idl::Hub for Server {
    /// Start the agent service on every configured host.
    async fn start_agents(&self, _request: Request<idl::StartAgentsRequest>) -> RpcResult<Response<idl::StartAgentsReply>> {
        let ssh = LatticeSsh {
            hostnames: self.inner.config.hostnames.clone(),
            command: start_agent_command(&self.inner.config.service_name),
        };
        let out = run_utility(&self.inner.config.gp_home, &ssh).await.map_err(AppError::grpc)?;
        // The remote shell reports per-host failures on stdout with a zero
        // exit code, so the output has to be inspected as well.
        if out.contains("ERROR") || out.contains("No such file or directory") {
            return Err(AppError::grpc(anyhow!("could not start agents: {}", out.trim())));
        }

        // Make sure the services actually came up.
        self.dial_all_agents().await.map_err(AppError::grpc)?;
        Ok(Response::new(idl::StartAgentsReply {}))
    }

    /// Stop the agent service on every configured host.
    async fn stop_agents(&self, _request: Request<idl::StopAgentsRequest>) -> RpcResult<Response<idl::StopAgentsReply>> {
        let conns = self.dial_all_agents().await.map_err(AppError::grpc)?;
        let res = execute_rpc(&conns, |conn| async move {
            let mut client = conn.client;
            match tokio::time::timeout(Duration::from_secs(5), client.stop(idl::StopAgentRequest {})).await {
                Ok(Ok(_reply)) => Ok(()),
                // A transport-closed response means the agent went down
                // before flushing its reply, which is what was asked for.
                Ok(Err(status)) if status.code() == Code::Unavailable => Ok(()),
                Ok(Err(status)) => Err(anyhow!("failed to stop agent: {}", status.message())),
                Err(_elapsed) => Err(anyhow!("timed out waiting for agent to stop")),
            }
        })
        .await;
        self.clear_conns().await;
        res.map_err(AppError::grpc)?;
        Ok(Response::new(idl::StopAgentsReply {}))
    }

    /// Collect liveness info from every agent.
    async fn status_agents(&self, _request: Request<idl::StatusAgentsRequest>) -> RpcResult<Response<idl::StatusAgentsReply>> {
        let conns = self.dial_all_agents().await.map_err(AppError::grpc)?;
        let statuses = Arc::new(StdMutex::new(Vec::new()));
        let collect = statuses.clone();
        execute_rpc(&conns, move |conn| {
            let collect = collect.clone();
            async move {
                let mut client = conn.client;
                let reply = client
                    .status(idl::StatusAgentRequest {})
                    .await
                    .map_err(|status| anyhow!("failed to get agent status: {}", status.message()))?
                    .into_inner();
                collect.lock().expect("status collection mutex poisoned").push(idl::ServiceStatus {
                    role: "Agent".to_string(),
                    host: conn.hostname,
                    status: reply.status,
                    uptime: reply.uptime,
                    pid: reply.pid,
                });
                Ok(())
            }
        })
        .await
        .map_err(AppError::grpc)?;

        let statuses = statuses.lock().expect("status collection mutex poisoned").clone();
        Ok(Response::new(idl::StatusAgentsReply { statuses }))
    }

    /// Stop this hub process.
    async fn stop(&self, _request: Request<idl::StopHubRequest>) -> RpcResult<Response<idl::StopHubReply>> {
        tracing::info!("received stop command, attempting graceful shutdown");
        let _res = self.inner.shutdown.send(());
        Ok(Response::new(idl::StopHubReply {}))
    }

    /// Resolve a list of addresses to their canonical host names.
    async fn get_all_host_names(&self, request: Request<idl::GetAllHostNamesRequest>) -> RpcResult<Response<idl::GetAllHostNamesReply>> {
        let req = request.into_inner();
        let addresses: BTreeSet<String> = req.host_list.into_iter().collect();

        let mut tasks = Vec::with_capacity(addresses.len());
        for address in addresses {
            let server = self.clone();
            tasks.push((
                address.clone(),
                tokio::spawn(async move {
                    let mut client = server.dial_agent(&address).await?;
                    let reply = client
                        .get_host_name(idl::GetHostNameRequest {})
                        .await
                        .map_err(|status| anyhow!("getting hostname failed: {}", status.message()))?;
                    Ok::<_, anyhow::Error>(reply.into_inner().hostname)
                }),
            ));
        }

        let mut host_name_map = std::collections::HashMap::new();
        for (address, task) in tasks {
            let hostname = match task.await {
                Ok(Ok(hostname)) => hostname,
                Ok(Err(err)) => return Err(AppError::grpc(anyhow!("host: {}, {:#}", address, err))),
                Err(err) => return Err(AppError::grpc(anyhow!("host: {}, task panicked: {}", address, err))),
            };
            host_name_map.insert(address, hostname);
        }
        Ok(Response::new(idl::GetAllHostNamesReply { host_name_map }))
    }

    /// Create and register mirrors for already-registered primaries.
    async fn add_mirrors(&self, request: Request<idl::AddMirrorsRequest>) -> RpcResult<Response<idl::AddMirrorsReply>> {
        let req = request.into_inner();
        mirrors::add_mirrors(self, &HubStream::disabled(), &req).await.map_err(AppError::grpc)?;
        Ok(Response::new(idl::AddMirrorsReply {}))
    }

    /// Server streaming response type for the MakeCluster method.
    type MakeClusterStream = ReceiverStream<RpcResult<idl::HubReply>>;

    /// Initialize a cluster from empty disks, streaming progress events.
    async fn make_cluster(&self, request: Request<idl::MakeClusterRequest>) -> RpcResult<Response<Self::MakeClusterStream>> {
        let req = request.into_inner();
        let (tx, rx) = mpsc::channel(64);
        let server = self.clone();
        tokio::spawn(async move {
            let stream = HubStream::new(tx);
            make_cluster::make_cluster(&server, &stream, req).await;
        });
        Ok(Response::new(ReceiverStream::new(rx)))
    }
}
