///////////////////////////////////////////////////////////////////////////////
// Components /////////////////////////////////////////////////////////////////

/// A storage/compute unit of the cluster.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Segment {
    #[prost(int32, tag = "1")]
    pub port: i32,
    #[prost(string, tag = "2")]
    pub data_directory: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub host_name: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub host_address: ::prost::alloc::string::String,
    #[prost(int32, tag = "5")]
    pub contentid: i32,
    #[prost(int32, tag = "6")]
    pub dbid: i32,
}
/// A primary and its optional mirror.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SegmentPair {
    #[prost(message, optional, tag = "1")]
    pub primary: ::core::option::Option<Segment>,
    #[prost(message, optional, tag = "2")]
    pub mirror: ::core::option::Option<Segment>,
}
/// The materialized target topology.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ClusterPlan {
    #[prost(message, optional, tag = "1")]
    pub coordinator: ::core::option::Option<Segment>,
    #[prost(message, repeated, tag = "2")]
    pub segment_array: ::prost::alloc::vec::Vec<SegmentPair>,
}
/// Locale settings for new segments; individual fields override lc_all.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Locale {
    #[prost(string, tag = "1")]
    pub lc_all: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub lc_collate: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub lc_ctype: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub lc_messages: ::prost::alloc::string::String,
    #[prost(string, tag = "5")]
    pub lc_monetary: ::prost::alloc::string::String,
    #[prost(string, tag = "6")]
    pub lc_numeric: ::prost::alloc::string::String,
    #[prost(string, tag = "7")]
    pub lc_time: ::prost::alloc::string::String,
}
/// Cluster-wide initialization parameters.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ClusterParams {
    #[prost(map = "string, string", tag = "1")]
    pub coordinator_config: ::std::collections::HashMap<::prost::alloc::string::String, ::prost::alloc::string::String>,
    #[prost(map = "string, string", tag = "2")]
    pub segment_config: ::std::collections::HashMap<::prost::alloc::string::String, ::prost::alloc::string::String>,
    #[prost(map = "string, string", tag = "3")]
    pub common_config: ::std::collections::HashMap<::prost::alloc::string::String, ::prost::alloc::string::String>,
    #[prost(message, optional, tag = "4")]
    pub locale: ::core::option::Option<Locale>,
    #[prost(bool, tag = "5")]
    pub hba_hostnames: bool,
    #[prost(string, tag = "6")]
    pub encoding: ::prost::alloc::string::String,
    #[prost(string, tag = "7")]
    pub su_password: ::prost::alloc::string::String,
    #[prost(string, tag = "8")]
    pub db_name: ::prost::alloc::string::String,
    #[prost(bool, tag = "9")]
    pub data_checksums: bool,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MakeClusterRequest {
    #[prost(message, optional, tag = "1")]
    pub plan: ::core::option::Option<ClusterPlan>,
    #[prost(message, optional, tag = "2")]
    pub cluster_params: ::core::option::Option<ClusterParams>,
    #[prost(bool, tag = "3")]
    pub force_flag: bool,
    #[prost(bool, tag = "4")]
    pub verbose: bool,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LogMessage {
    #[prost(string, tag = "1")]
    pub message: ::prost::alloc::string::String,
    #[prost(enumeration = "LogLevel", tag = "2")]
    pub level: i32,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProgressMessage {
    #[prost(string, tag = "1")]
    pub label: ::prost::alloc::string::String,
    #[prost(int32, tag = "2")]
    pub current: i32,
    #[prost(int32, tag = "3")]
    pub total: i32,
}
/// One event pushed from the hub to the invoking CLI.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HubReply {
    #[prost(oneof = "hub_reply::Message", tags = "1, 2, 3")]
    pub message: ::core::option::Option<hub_reply::Message>,
}
/// Nested message and enum types in `HubReply`.
pub mod hub_reply {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Message {
        #[prost(message, tag = "1")]
        LogMsg(super::LogMessage),
        #[prost(string, tag = "2")]
        StdoutMsg(::prost::alloc::string::String),
        #[prost(message, tag = "3")]
        ProgressMsg(super::ProgressMessage),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ValidateHostEnvRequest {
    #[prost(string, repeated, tag = "1")]
    pub directory_list: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(uint32, repeated, tag = "2")]
    pub port_list: ::prost::alloc::vec::Vec<u32>,
    #[prost(string, repeated, tag = "3")]
    pub host_address_list: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(message, optional, tag = "4")]
    pub locale: ::core::option::Option<Locale>,
    #[prost(string, tag = "5")]
    pub gp_version: ::prost::alloc::string::String,
    #[prost(bool, tag = "6")]
    pub forced: bool,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ValidateHostEnvReply {
    #[prost(message, repeated, tag = "1")]
    pub messages: ::prost::alloc::vec::Vec<LogMessage>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MakeSegmentRequest {
    #[prost(message, optional, tag = "1")]
    pub segment: ::core::option::Option<Segment>,
    #[prost(message, optional, tag = "2")]
    pub locale: ::core::option::Option<Locale>,
    #[prost(string, tag = "3")]
    pub encoding: ::prost::alloc::string::String,
    #[prost(map = "string, string", tag = "4")]
    pub seg_config: ::std::collections::HashMap<::prost::alloc::string::String, ::prost::alloc::string::String>,
    #[prost(string, repeated, tag = "5")]
    pub coordinator_addrs: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(bool, tag = "6")]
    pub hba_hostnames: bool,
    #[prost(bool, tag = "7")]
    pub data_checksums: bool,
    #[prost(bool, tag = "8")]
    pub forced: bool,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MakeSegmentReply {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StartSegmentRequest {
    #[prost(string, tag = "1")]
    pub data_dir: ::prost::alloc::string::String,
    #[prost(bool, tag = "2")]
    pub wait: bool,
    #[prost(string, tag = "3")]
    pub options: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StartSegmentReply {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StopAgentRequest {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StopAgentReply {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StatusAgentRequest {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StatusAgentReply {
    #[prost(string, tag = "1")]
    pub status: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub uptime: ::prost::alloc::string::String,
    #[prost(uint32, tag = "3")]
    pub pid: u32,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetHostNameRequest {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetHostNameReply {
    #[prost(string, tag = "1")]
    pub hostname: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetInterfaceAddrsRequest {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetInterfaceAddrsReply {
    #[prost(string, repeated, tag = "1")]
    pub addrs: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PgBasebackupRequest {
    #[prost(string, tag = "1")]
    pub target_dir: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub source_host: ::prost::alloc::string::String,
    #[prost(int32, tag = "3")]
    pub source_port: i32,
    #[prost(bool, tag = "4")]
    pub create_slot: bool,
    #[prost(bool, tag = "5")]
    pub force_overwrite: bool,
    #[prost(int32, tag = "6")]
    pub target_dbid: i32,
    #[prost(bool, tag = "7")]
    pub write_recovery_conf: bool,
    #[prost(string, tag = "8")]
    pub replication_slot_name: ::prost::alloc::string::String,
    #[prost(string, repeated, tag = "9")]
    pub exclude_paths: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PgBasebackupReply {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PgControlDataRequest {
    #[prost(string, tag = "1")]
    pub pgdata: ::prost::alloc::string::String,
    #[prost(string, repeated, tag = "2")]
    pub params: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PgControlDataReply {
    #[prost(map = "string, string", tag = "1")]
    pub result: ::std::collections::HashMap<::prost::alloc::string::String, ::prost::alloc::string::String>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdatePgConfRequest {
    #[prost(string, tag = "1")]
    pub pgdata: ::prost::alloc::string::String,
    #[prost(map = "string, string", tag = "2")]
    pub params: ::std::collections::HashMap<::prost::alloc::string::String, ::prost::alloc::string::String>,
    #[prost(bool, tag = "3")]
    pub overwrite: bool,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdatePgConfReply {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdatePgHbaConfRequest {
    #[prost(string, tag = "1")]
    pub pgdata: ::prost::alloc::string::String,
    #[prost(string, repeated, tag = "2")]
    pub addrs: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(bool, tag = "3")]
    pub replication: bool,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdatePgHbaConfReply {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RemoveDirectoryRequest {
    #[prost(string, tag = "1")]
    pub data_directory: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RemoveDirectoryReply {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StartAgentsRequest {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StartAgentsReply {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StopAgentsRequest {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StopAgentsReply {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StatusAgentsRequest {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ServiceStatus {
    #[prost(string, tag = "1")]
    pub role: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub host: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub status: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub uptime: ::prost::alloc::string::String,
    #[prost(uint32, tag = "5")]
    pub pid: u32,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StatusAgentsReply {
    #[prost(message, repeated, tag = "1")]
    pub statuses: ::prost::alloc::vec::Vec<ServiceStatus>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StopHubRequest {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StopHubReply {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetAllHostNamesRequest {
    #[prost(string, repeated, tag = "1")]
    pub host_list: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetAllHostNamesReply {
    #[prost(map = "string, string", tag = "1")]
    pub host_name_map: ::std::collections::HashMap<::prost::alloc::string::String, ::prost::alloc::string::String>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AddMirrorsRequest {
    #[prost(string, tag = "1")]
    pub coordinator_data_dir: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "2")]
    pub mirrors: ::prost::alloc::vec::Vec<Segment>,
    #[prost(bool, tag = "3")]
    pub hba_hostnames: bool,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AddMirrorsReply {}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warning = 2,
    Error = 3,
    Fatal = 4,
}
#[doc = r" Generated client implementations."]
pub mod agent_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::*;
    #[doc = " The per-host worker service."]
    #[derive(Debug, Clone)]
    pub struct AgentClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl AgentClient<tonic::transport::Channel> {
        #[doc = r" Attempt to create a new client by connecting to a given endpoint."]
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: std::convert::TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> AgentClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::ResponseBody: Body + Send + Sync + 'static,
        T::Error: Into<StdError>,
        <T::ResponseBody as Body>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_interceptor<F>(inner: T, interceptor: F) -> AgentClient<InterceptedService<T, F>>
        where
            F: tonic::service::Interceptor,
            T: tonic::codegen::Service<http::Request<tonic::body::BoxBody>, Response = http::Response<<T as tonic::client::GrpcService<tonic::body::BoxBody>>::ResponseBody>>,
            <T as tonic::codegen::Service<http::Request<tonic::body::BoxBody>>>::Error: Into<StdError> + Send + Sync,
        {
            AgentClient::new(InterceptedService::new(inner, interceptor))
        }
        #[doc = " Validate this host's environment for the given segment layout."]
        pub async fn validate_host_env(&mut self, request: impl tonic::IntoRequest<super::ValidateHostEnvRequest>) -> Result<tonic::Response<super::ValidateHostEnvReply>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| tonic::Status::new(tonic::Code::Unknown, format!("Service was not ready: {}", e.into())))?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/lattice.Agent/ValidateHostEnv");
            self.inner.unary(request.into_request(), path, codec).await
        }
        #[doc = " Initialize one segment data directory on this host."]
        pub async fn make_segment(&mut self, request: impl tonic::IntoRequest<super::MakeSegmentRequest>) -> Result<tonic::Response<super::MakeSegmentReply>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| tonic::Status::new(tonic::Code::Unknown, format!("Service was not ready: {}", e.into())))?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/lattice.Agent/MakeSegment");
            self.inner.unary(request.into_request(), path, codec).await
        }
        #[doc = " Start one local segment via pg_ctl."]
        pub async fn start_segment(&mut self, request: impl tonic::IntoRequest<super::StartSegmentRequest>) -> Result<tonic::Response<super::StartSegmentReply>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| tonic::Status::new(tonic::Code::Unknown, format!("Service was not ready: {}", e.into())))?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/lattice.Agent/StartSegment");
            self.inner.unary(request.into_request(), path, codec).await
        }
        #[doc = " Stop this agent process."]
        pub async fn stop(&mut self, request: impl tonic::IntoRequest<super::StopAgentRequest>) -> Result<tonic::Response<super::StopAgentReply>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| tonic::Status::new(tonic::Code::Unknown, format!("Service was not ready: {}", e.into())))?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/lattice.Agent/Stop");
            self.inner.unary(request.into_request(), path, codec).await
        }
        #[doc = " Report this agent's liveness info."]
        pub async fn status(&mut self, request: impl tonic::IntoRequest<super::StatusAgentRequest>) -> Result<tonic::Response<super::StatusAgentReply>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| tonic::Status::new(tonic::Code::Unknown, format!("Service was not ready: {}", e.into())))?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/lattice.Agent/Status");
            self.inner.unary(request.into_request(), path, codec).await
        }
        #[doc = " Return this host's canonical name."]
        pub async fn get_host_name(&mut self, request: impl tonic::IntoRequest<super::GetHostNameRequest>) -> Result<tonic::Response<super::GetHostNameReply>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| tonic::Status::new(tonic::Code::Unknown, format!("Service was not ready: {}", e.into())))?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/lattice.Agent/GetHostName");
            self.inner.unary(request.into_request(), path, codec).await
        }
        #[doc = " Return this host's non-loopback interface addresses in CIDR form."]
        pub async fn get_interface_addrs(&mut self, request: impl tonic::IntoRequest<super::GetInterfaceAddrsRequest>) -> Result<tonic::Response<super::GetInterfaceAddrsReply>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| tonic::Status::new(tonic::Code::Unknown, format!("Service was not ready: {}", e.into())))?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/lattice.Agent/GetInterfaceAddrs");
            self.inner.unary(request.into_request(), path, codec).await
        }
        #[doc = " Run a base backup of a remote primary into a local mirror directory."]
        pub async fn pg_basebackup(&mut self, request: impl tonic::IntoRequest<super::PgBasebackupRequest>) -> Result<tonic::Response<super::PgBasebackupReply>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| tonic::Status::new(tonic::Code::Unknown, format!("Service was not ready: {}", e.into())))?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/lattice.Agent/PgBasebackup");
            self.inner.unary(request.into_request(), path, codec).await
        }
        #[doc = " Return fields parsed from pg_controldata output."]
        pub async fn pg_control_data(&mut self, request: impl tonic::IntoRequest<super::PgControlDataRequest>) -> Result<tonic::Response<super::PgControlDataReply>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| tonic::Status::new(tonic::Code::Unknown, format!("Service was not ready: {}", e.into())))?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/lattice.Agent/PgControlData");
            self.inner.unary(request.into_request(), path, codec).await
        }
        #[doc = " Rewrite settings in a local postgresql.conf."]
        pub async fn update_pg_conf(&mut self, request: impl tonic::IntoRequest<super::UpdatePgConfRequest>) -> Result<tonic::Response<super::UpdatePgConfReply>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| tonic::Status::new(tonic::Code::Unknown, format!("Service was not ready: {}", e.into())))?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/lattice.Agent/UpdatePgConf");
            self.inner.unary(request.into_request(), path, codec).await
        }
        #[doc = " Append access entries to a local pg_hba.conf and reload."]
        pub async fn update_pg_hba_conf(&mut self, request: impl tonic::IntoRequest<super::UpdatePgHbaConfRequest>) -> Result<tonic::Response<super::UpdatePgHbaConfReply>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| tonic::Status::new(tonic::Code::Unknown, format!("Service was not ready: {}", e.into())))?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/lattice.Agent/UpdatePgHbaConf");
            self.inner.unary(request.into_request(), path, codec).await
        }
        #[doc = " Remove a local data directory; used by cluster cleanup."]
        pub async fn remove_directory(&mut self, request: impl tonic::IntoRequest<super::RemoveDirectoryRequest>) -> Result<tonic::Response<super::RemoveDirectoryReply>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| tonic::Status::new(tonic::Code::Unknown, format!("Service was not ready: {}", e.into())))?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/lattice.Agent/RemoveDirectory");
            self.inner.unary(request.into_request(), path, codec).await
        }
    }
}
#[doc = r" Generated client implementations."]
pub mod hub_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::*;
    #[doc = " The orchestrator service on the coordinator host."]
    #[derive(Debug, Clone)]
    pub struct HubClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl HubClient<tonic::transport::Channel> {
        #[doc = r" Attempt to create a new client by connecting to a given endpoint."]
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: std::convert::TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> HubClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::ResponseBody: Body + Send + Sync + 'static,
        T::Error: Into<StdError>,
        <T::ResponseBody as Body>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_interceptor<F>(inner: T, interceptor: F) -> HubClient<InterceptedService<T, F>>
        where
            F: tonic::service::Interceptor,
            T: tonic::codegen::Service<http::Request<tonic::body::BoxBody>, Response = http::Response<<T as tonic::client::GrpcService<tonic::body::BoxBody>>::ResponseBody>>,
            <T as tonic::codegen::Service<http::Request<tonic::body::BoxBody>>>::Error: Into<StdError> + Send + Sync,
        {
            HubClient::new(InterceptedService::new(inner, interceptor))
        }
        #[doc = " Start the agent service on every configured host."]
        pub async fn start_agents(&mut self, request: impl tonic::IntoRequest<super::StartAgentsRequest>) -> Result<tonic::Response<super::StartAgentsReply>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| tonic::Status::new(tonic::Code::Unknown, format!("Service was not ready: {}", e.into())))?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/lattice.Hub/StartAgents");
            self.inner.unary(request.into_request(), path, codec).await
        }
        #[doc = " Stop the agent service on every configured host."]
        pub async fn stop_agents(&mut self, request: impl tonic::IntoRequest<super::StopAgentsRequest>) -> Result<tonic::Response<super::StopAgentsReply>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| tonic::Status::new(tonic::Code::Unknown, format!("Service was not ready: {}", e.into())))?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/lattice.Hub/StopAgents");
            self.inner.unary(request.into_request(), path, codec).await
        }
        #[doc = " Collect liveness info from every agent."]
        pub async fn status_agents(&mut self, request: impl tonic::IntoRequest<super::StatusAgentsRequest>) -> Result<tonic::Response<super::StatusAgentsReply>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| tonic::Status::new(tonic::Code::Unknown, format!("Service was not ready: {}", e.into())))?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/lattice.Hub/StatusAgents");
            self.inner.unary(request.into_request(), path, codec).await
        }
        #[doc = " Stop this hub process."]
        pub async fn stop(&mut self, request: impl tonic::IntoRequest<super::StopHubRequest>) -> Result<tonic::Response<super::StopHubReply>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| tonic::Status::new(tonic::Code::Unknown, format!("Service was not ready: {}", e.into())))?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/lattice.Hub/Stop");
            self.inner.unary(request.into_request(), path, codec).await
        }
        #[doc = " Resolve a list of addresses to their canonical host names."]
        pub async fn get_all_host_names(&mut self, request: impl tonic::IntoRequest<super::GetAllHostNamesRequest>) -> Result<tonic::Response<super::GetAllHostNamesReply>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| tonic::Status::new(tonic::Code::Unknown, format!("Service was not ready: {}", e.into())))?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/lattice.Hub/GetAllHostNames");
            self.inner.unary(request.into_request(), path, codec).await
        }
        #[doc = " Create and register mirrors for already-registered primaries."]
        pub async fn add_mirrors(&mut self, request: impl tonic::IntoRequest<super::AddMirrorsRequest>) -> Result<tonic::Response<super::AddMirrorsReply>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| tonic::Status::new(tonic::Code::Unknown, format!("Service was not ready: {}", e.into())))?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/lattice.Hub/AddMirrors");
            self.inner.unary(request.into_request(), path, codec).await
        }
        #[doc = " Initialize a cluster from empty disks, streaming progress events."]
        pub async fn make_cluster(&mut self, request: impl tonic::IntoRequest<super::MakeClusterRequest>) -> Result<tonic::Response<tonic::codec::Streaming<super::HubReply>>, tonic::Status> {
            self.inner
                .ready()
                .await
                .map_err(|e| tonic::Status::new(tonic::Code::Unknown, format!("Service was not ready: {}", e.into())))?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/lattice.Hub/MakeCluster");
            self.inner.server_streaming(request.into_request(), path, codec).await
        }
    }
}
#[doc = r" Generated server implementations."]
pub mod agent_server {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::*;
    #[doc = "Generated trait containing gRPC methods that should be implemented for use with AgentServer."]
    #[async_trait]
    pub trait Agent: Send + Sync + 'static {
        #[doc = " Validate this host's environment for the given segment layout."]
        async fn validate_host_env(&self, request: tonic::Request<super::ValidateHostEnvRequest>) -> Result<tonic::Response<super::ValidateHostEnvReply>, tonic::Status>;
        #[doc = " Initialize one segment data directory on this host."]
        async fn make_segment(&self, request: tonic::Request<super::MakeSegmentRequest>) -> Result<tonic::Response<super::MakeSegmentReply>, tonic::Status>;
        #[doc = " Start one local segment via pg_ctl."]
        async fn start_segment(&self, request: tonic::Request<super::StartSegmentRequest>) -> Result<tonic::Response<super::StartSegmentReply>, tonic::Status>;
        #[doc = " Stop this agent process."]
        async fn stop(&self, request: tonic::Request<super::StopAgentRequest>) -> Result<tonic::Response<super::StopAgentReply>, tonic::Status>;
        #[doc = " Report this agent's liveness info."]
        async fn status(&self, request: tonic::Request<super::StatusAgentRequest>) -> Result<tonic::Response<super::StatusAgentReply>, tonic::Status>;
        #[doc = " Return this host's canonical name."]
        async fn get_host_name(&self, request: tonic::Request<super::GetHostNameRequest>) -> Result<tonic::Response<super::GetHostNameReply>, tonic::Status>;
        #[doc = " Return this host's non-loopback interface addresses in CIDR form."]
        async fn get_interface_addrs(&self, request: tonic::Request<super::GetInterfaceAddrsRequest>) -> Result<tonic::Response<super::GetInterfaceAddrsReply>, tonic::Status>;
        #[doc = " Run a base backup of a remote primary into a local mirror directory."]
        async fn pg_basebackup(&self, request: tonic::Request<super::PgBasebackupRequest>) -> Result<tonic::Response<super::PgBasebackupReply>, tonic::Status>;
        #[doc = " Return fields parsed from pg_controldata output."]
        async fn pg_control_data(&self, request: tonic::Request<super::PgControlDataRequest>) -> Result<tonic::Response<super::PgControlDataReply>, tonic::Status>;
        #[doc = " Rewrite settings in a local postgresql.conf."]
        async fn update_pg_conf(&self, request: tonic::Request<super::UpdatePgConfRequest>) -> Result<tonic::Response<super::UpdatePgConfReply>, tonic::Status>;
        #[doc = " Append access entries to a local pg_hba.conf and reload."]
        async fn update_pg_hba_conf(&self, request: tonic::Request<super::UpdatePgHbaConfRequest>) -> Result<tonic::Response<super::UpdatePgHbaConfReply>, tonic::Status>;
        #[doc = " Remove a local data directory; used by cluster cleanup."]
        async fn remove_directory(&self, request: tonic::Request<super::RemoveDirectoryRequest>) -> Result<tonic::Response<super::RemoveDirectoryReply>, tonic::Status>;
    }
    #[doc = " The per-host worker service."]
    #[derive(Debug)]
    pub struct AgentServer<T: Agent> {
        inner: _Inner<T>,
        accept_compression_encodings: (),
        send_compression_encodings: (),
    }
    struct _Inner<T>(Arc<T>);
    impl<T: Agent> AgentServer<T> {
        pub fn new(inner: T) -> Self {
            let inner = Arc::new(inner);
            let inner = _Inner(inner);
            Self {
                inner,
                accept_compression_encodings: Default::default(),
                send_compression_encodings: Default::default(),
            }
        }
        pub fn with_interceptor<F>(inner: T, interceptor: F) -> InterceptedService<Self, F>
        where
            F: tonic::service::Interceptor,
        {
            InterceptedService::new(Self::new(inner), interceptor)
        }
    }
    impl<T, B> tonic::codegen::Service<http::Request<B>> for AgentServer<T>
    where
        T: Agent,
        B: Body + Send + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = Never;
        type Future = BoxFuture<Self::Response, Self::Error>;
        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }
        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            let inner = self.inner.clone();
            match req.uri().path() {
                "/lattice.Agent/ValidateHostEnv" => {
                    #[allow(non_camel_case_types)]
                    struct ValidateHostEnvSvc<T: Agent>(pub Arc<T>);
                    impl<T: Agent> tonic::server::UnaryService<super::ValidateHostEnvRequest> for ValidateHostEnvSvc<T> {
                        type Response = super::ValidateHostEnvReply;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(&mut self, request: tonic::Request<super::ValidateHostEnvRequest>) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).validate_host_env(request).await };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let inner = inner.0;
                        let method = ValidateHostEnvSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec).apply_compression_config(accept_compression_encodings, send_compression_encodings);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/lattice.Agent/MakeSegment" => {
                    #[allow(non_camel_case_types)]
                    struct MakeSegmentSvc<T: Agent>(pub Arc<T>);
                    impl<T: Agent> tonic::server::UnaryService<super::MakeSegmentRequest> for MakeSegmentSvc<T> {
                        type Response = super::MakeSegmentReply;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(&mut self, request: tonic::Request<super::MakeSegmentRequest>) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).make_segment(request).await };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let inner = inner.0;
                        let method = MakeSegmentSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec).apply_compression_config(accept_compression_encodings, send_compression_encodings);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/lattice.Agent/StartSegment" => {
                    #[allow(non_camel_case_types)]
                    struct StartSegmentSvc<T: Agent>(pub Arc<T>);
                    impl<T: Agent> tonic::server::UnaryService<super::StartSegmentRequest> for StartSegmentSvc<T> {
                        type Response = super::StartSegmentReply;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(&mut self, request: tonic::Request<super::StartSegmentRequest>) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).start_segment(request).await };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let inner = inner.0;
                        let method = StartSegmentSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec).apply_compression_config(accept_compression_encodings, send_compression_encodings);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/lattice.Agent/Stop" => {
                    #[allow(non_camel_case_types)]
                    struct StopSvc<T: Agent>(pub Arc<T>);
                    impl<T: Agent> tonic::server::UnaryService<super::StopAgentRequest> for StopSvc<T> {
                        type Response = super::StopAgentReply;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(&mut self, request: tonic::Request<super::StopAgentRequest>) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).stop(request).await };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let inner = inner.0;
                        let method = StopSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec).apply_compression_config(accept_compression_encodings, send_compression_encodings);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/lattice.Agent/Status" => {
                    #[allow(non_camel_case_types)]
                    struct StatusSvc<T: Agent>(pub Arc<T>);
                    impl<T: Agent> tonic::server::UnaryService<super::StatusAgentRequest> for StatusSvc<T> {
                        type Response = super::StatusAgentReply;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(&mut self, request: tonic::Request<super::StatusAgentRequest>) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).status(request).await };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let inner = inner.0;
                        let method = StatusSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec).apply_compression_config(accept_compression_encodings, send_compression_encodings);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/lattice.Agent/GetHostName" => {
                    #[allow(non_camel_case_types)]
                    struct GetHostNameSvc<T: Agent>(pub Arc<T>);
                    impl<T: Agent> tonic::server::UnaryService<super::GetHostNameRequest> for GetHostNameSvc<T> {
                        type Response = super::GetHostNameReply;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(&mut self, request: tonic::Request<super::GetHostNameRequest>) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).get_host_name(request).await };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let inner = inner.0;
                        let method = GetHostNameSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec).apply_compression_config(accept_compression_encodings, send_compression_encodings);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/lattice.Agent/GetInterfaceAddrs" => {
                    #[allow(non_camel_case_types)]
                    struct GetInterfaceAddrsSvc<T: Agent>(pub Arc<T>);
                    impl<T: Agent> tonic::server::UnaryService<super::GetInterfaceAddrsRequest> for GetInterfaceAddrsSvc<T> {
                        type Response = super::GetInterfaceAddrsReply;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(&mut self, request: tonic::Request<super::GetInterfaceAddrsRequest>) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).get_interface_addrs(request).await };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let inner = inner.0;
                        let method = GetInterfaceAddrsSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec).apply_compression_config(accept_compression_encodings, send_compression_encodings);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/lattice.Agent/PgBasebackup" => {
                    #[allow(non_camel_case_types)]
                    struct PgBasebackupSvc<T: Agent>(pub Arc<T>);
                    impl<T: Agent> tonic::server::UnaryService<super::PgBasebackupRequest> for PgBasebackupSvc<T> {
                        type Response = super::PgBasebackupReply;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(&mut self, request: tonic::Request<super::PgBasebackupRequest>) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).pg_basebackup(request).await };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let inner = inner.0;
                        let method = PgBasebackupSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec).apply_compression_config(accept_compression_encodings, send_compression_encodings);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/lattice.Agent/PgControlData" => {
                    #[allow(non_camel_case_types)]
                    struct PgControlDataSvc<T: Agent>(pub Arc<T>);
                    impl<T: Agent> tonic::server::UnaryService<super::PgControlDataRequest> for PgControlDataSvc<T> {
                        type Response = super::PgControlDataReply;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(&mut self, request: tonic::Request<super::PgControlDataRequest>) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).pg_control_data(request).await };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let inner = inner.0;
                        let method = PgControlDataSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec).apply_compression_config(accept_compression_encodings, send_compression_encodings);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/lattice.Agent/UpdatePgConf" => {
                    #[allow(non_camel_case_types)]
                    struct UpdatePgConfSvc<T: Agent>(pub Arc<T>);
                    impl<T: Agent> tonic::server::UnaryService<super::UpdatePgConfRequest> for UpdatePgConfSvc<T> {
                        type Response = super::UpdatePgConfReply;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(&mut self, request: tonic::Request<super::UpdatePgConfRequest>) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).update_pg_conf(request).await };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let inner = inner.0;
                        let method = UpdatePgConfSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec).apply_compression_config(accept_compression_encodings, send_compression_encodings);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/lattice.Agent/UpdatePgHbaConf" => {
                    #[allow(non_camel_case_types)]
                    struct UpdatePgHbaConfSvc<T: Agent>(pub Arc<T>);
                    impl<T: Agent> tonic::server::UnaryService<super::UpdatePgHbaConfRequest> for UpdatePgHbaConfSvc<T> {
                        type Response = super::UpdatePgHbaConfReply;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(&mut self, request: tonic::Request<super::UpdatePgHbaConfRequest>) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).update_pg_hba_conf(request).await };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let inner = inner.0;
                        let method = UpdatePgHbaConfSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec).apply_compression_config(accept_compression_encodings, send_compression_encodings);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/lattice.Agent/RemoveDirectory" => {
                    #[allow(non_camel_case_types)]
                    struct RemoveDirectorySvc<T: Agent>(pub Arc<T>);
                    impl<T: Agent> tonic::server::UnaryService<super::RemoveDirectoryRequest> for RemoveDirectorySvc<T> {
                        type Response = super::RemoveDirectoryReply;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(&mut self, request: tonic::Request<super::RemoveDirectoryRequest>) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).remove_directory(request).await };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let inner = inner.0;
                        let method = RemoveDirectorySvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec).apply_compression_config(accept_compression_encodings, send_compression_encodings);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                _ => Box::pin(async move {
                    Ok(http::Response::builder()
                        .status(200)
                        .header("grpc-status", "12")
                        .header("content-type", "application/grpc")
                        .body(empty_body())
                        .unwrap())
                }),
            }
        }
    }
    impl<T: Agent> Clone for AgentServer<T> {
        fn clone(&self) -> Self {
            let inner = self.inner.clone();
            Self {
                inner,
                accept_compression_encodings: self.accept_compression_encodings,
                send_compression_encodings: self.send_compression_encodings,
            }
        }
    }
    impl<T: Agent> Clone for _Inner<T> {
        fn clone(&self) -> Self {
            Self(self.0.clone())
        }
    }
    impl<T: std::fmt::Debug> std::fmt::Debug for _Inner<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self.0)
        }
    }
    impl<T: Agent> tonic::transport::NamedService for AgentServer<T> {
        const NAME: &'static str = "lattice.Agent";
    }
}
#[doc = r" Generated server implementations."]
pub mod hub_server {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::*;
    #[doc = "Generated trait containing gRPC methods that should be implemented for use with HubServer."]
    #[async_trait]
    pub trait Hub: Send + Sync + 'static {
        #[doc = " Start the agent service on every configured host."]
        async fn start_agents(&self, request: tonic::Request<super::StartAgentsRequest>) -> Result<tonic::Response<super::StartAgentsReply>, tonic::Status>;
        #[doc = " Stop the agent service on every configured host."]
        async fn stop_agents(&self, request: tonic::Request<super::StopAgentsRequest>) -> Result<tonic::Response<super::StopAgentsReply>, tonic::Status>;
        #[doc = " Collect liveness info from every agent."]
        async fn status_agents(&self, request: tonic::Request<super::StatusAgentsRequest>) -> Result<tonic::Response<super::StatusAgentsReply>, tonic::Status>;
        #[doc = " Stop this hub process."]
        async fn stop(&self, request: tonic::Request<super::StopHubRequest>) -> Result<tonic::Response<super::StopHubReply>, tonic::Status>;
        #[doc = " Resolve a list of addresses to their canonical host names."]
        async fn get_all_host_names(&self, request: tonic::Request<super::GetAllHostNamesRequest>) -> Result<tonic::Response<super::GetAllHostNamesReply>, tonic::Status>;
        #[doc = " Create and register mirrors for already-registered primaries."]
        async fn add_mirrors(&self, request: tonic::Request<super::AddMirrorsRequest>) -> Result<tonic::Response<super::AddMirrorsReply>, tonic::Status>;
        #[doc = "Server streaming response type for the MakeCluster method."]
        type MakeClusterStream: futures_core::Stream<Item = Result<super::HubReply, tonic::Status>> + Send + 'static;
        #[doc = " Initialize a cluster from empty disks, streaming progress events."]
        async fn make_cluster(&self, request: tonic::Request<super::MakeClusterRequest>) -> Result<tonic::Response<Self::MakeClusterStream>, tonic::Status>;
    }
    #[doc = " The orchestrator service on the coordinator host."]
    #[derive(Debug)]
    pub struct HubServer<T: Hub> {
        inner: _Inner<T>,
        accept_compression_encodings: (),
        send_compression_encodings: (),
    }
    struct _Inner<T>(Arc<T>);
    impl<T: Hub> HubServer<T> {
        pub fn new(inner: T) -> Self {
            let inner = Arc::new(inner);
            let inner = _Inner(inner);
            Self {
                inner,
                accept_compression_encodings: Default::default(),
                send_compression_encodings: Default::default(),
            }
        }
        pub fn with_interceptor<F>(inner: T, interceptor: F) -> InterceptedService<Self, F>
        where
            F: tonic::service::Interceptor,
        {
            InterceptedService::new(Self::new(inner), interceptor)
        }
    }
    impl<T, B> tonic::codegen::Service<http::Request<B>> for HubServer<T>
    where
        T: Hub,
        B: Body + Send + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = Never;
        type Future = BoxFuture<Self::Response, Self::Error>;
        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }
        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            let inner = self.inner.clone();
            match req.uri().path() {
                "/lattice.Hub/StartAgents" => {
                    #[allow(non_camel_case_types)]
                    struct StartAgentsSvc<T: Hub>(pub Arc<T>);
                    impl<T: Hub> tonic::server::UnaryService<super::StartAgentsRequest> for StartAgentsSvc<T> {
                        type Response = super::StartAgentsReply;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(&mut self, request: tonic::Request<super::StartAgentsRequest>) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).start_agents(request).await };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let inner = inner.0;
                        let method = StartAgentsSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec).apply_compression_config(accept_compression_encodings, send_compression_encodings);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/lattice.Hub/StopAgents" => {
                    #[allow(non_camel_case_types)]
                    struct StopAgentsSvc<T: Hub>(pub Arc<T>);
                    impl<T: Hub> tonic::server::UnaryService<super::StopAgentsRequest> for StopAgentsSvc<T> {
                        type Response = super::StopAgentsReply;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(&mut self, request: tonic::Request<super::StopAgentsRequest>) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).stop_agents(request).await };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let inner = inner.0;
                        let method = StopAgentsSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec).apply_compression_config(accept_compression_encodings, send_compression_encodings);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/lattice.Hub/StatusAgents" => {
                    #[allow(non_camel_case_types)]
                    struct StatusAgentsSvc<T: Hub>(pub Arc<T>);
                    impl<T: Hub> tonic::server::UnaryService<super::StatusAgentsRequest> for StatusAgentsSvc<T> {
                        type Response = super::StatusAgentsReply;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(&mut self, request: tonic::Request<super::StatusAgentsRequest>) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).status_agents(request).await };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let inner = inner.0;
                        let method = StatusAgentsSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec).apply_compression_config(accept_compression_encodings, send_compression_encodings);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/lattice.Hub/Stop" => {
                    #[allow(non_camel_case_types)]
                    struct StopSvc<T: Hub>(pub Arc<T>);
                    impl<T: Hub> tonic::server::UnaryService<super::StopHubRequest> for StopSvc<T> {
                        type Response = super::StopHubReply;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(&mut self, request: tonic::Request<super::StopHubRequest>) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).stop(request).await };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let inner = inner.0;
                        let method = StopSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec).apply_compression_config(accept_compression_encodings, send_compression_encodings);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/lattice.Hub/GetAllHostNames" => {
                    #[allow(non_camel_case_types)]
                    struct GetAllHostNamesSvc<T: Hub>(pub Arc<T>);
                    impl<T: Hub> tonic::server::UnaryService<super::GetAllHostNamesRequest> for GetAllHostNamesSvc<T> {
                        type Response = super::GetAllHostNamesReply;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(&mut self, request: tonic::Request<super::GetAllHostNamesRequest>) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).get_all_host_names(request).await };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let inner = inner.0;
                        let method = GetAllHostNamesSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec).apply_compression_config(accept_compression_encodings, send_compression_encodings);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/lattice.Hub/AddMirrors" => {
                    #[allow(non_camel_case_types)]
                    struct AddMirrorsSvc<T: Hub>(pub Arc<T>);
                    impl<T: Hub> tonic::server::UnaryService<super::AddMirrorsRequest> for AddMirrorsSvc<T> {
                        type Response = super::AddMirrorsReply;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(&mut self, request: tonic::Request<super::AddMirrorsRequest>) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).add_mirrors(request).await };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let inner = inner.0;
                        let method = AddMirrorsSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec).apply_compression_config(accept_compression_encodings, send_compression_encodings);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/lattice.Hub/MakeCluster" => {
                    #[allow(non_camel_case_types)]
                    struct MakeClusterSvc<T: Hub>(pub Arc<T>);
                    impl<T: Hub> tonic::server::ServerStreamingService<super::MakeClusterRequest> for MakeClusterSvc<T> {
                        type Response = super::HubReply;
                        type ResponseStream = T::MakeClusterStream;
                        type Future = BoxFuture<tonic::Response<Self::ResponseStream>, tonic::Status>;
                        fn call(&mut self, request: tonic::Request<super::MakeClusterRequest>) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).make_cluster(request).await };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let inner = inner.0;
                        let method = MakeClusterSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec).apply_compression_config(accept_compression_encodings, send_compression_encodings);
                        let res = grpc.server_streaming(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                _ => Box::pin(async move {
                    Ok(http::Response::builder()
                        .status(200)
                        .header("grpc-status", "12")
                        .header("content-type", "application/grpc")
                        .body(empty_body())
                        .unwrap())
                }),
            }
        }
    }
    impl<T: Hub> Clone for HubServer<T> {
        fn clone(&self) -> Self {
            let inner = self.inner.clone();
            Self {
                inner,
                accept_compression_encodings: self.accept_compression_encodings,
                send_compression_encodings: self.send_compression_encodings,
            }
        }
    }
    impl<T: Hub> Clone for _Inner<T> {
        fn clone(&self) -> Self {
            Self(self.0.clone())
        }
    }
    impl<T: std::fmt::Debug> std::fmt::Debug for _Inner<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self.0)
        }
    }
    impl<T: Hub> tonic::transport::NamedService for HubServer<T> {
        const NAME: &'static str = "lattice.Hub";
    }
}
