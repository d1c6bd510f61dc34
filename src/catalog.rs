//! The declarative catalog of callback-style host APIs to adapt at bootstrap.
//!
//! Pure configuration data: which namespaces and functions the bridge knows
//! about, and which of them need a combiner for multi-value completions. The
//! catalog is written against a superset of host versions; names the live
//! host lacks are skipped by the walker.

use serde_json::{json, Value};

use crate::api_map::{leaf, leaf_with, node, ApiEntry};

fn leaves(names: &[&str]) -> Vec<ApiEntry> {
    names.iter().copied().map(leaf).collect()
}

/// get/set/clear triple used by every accessibility setting.
fn setting() -> Vec<ApiEntry> {
    leaves(&["get", "set", "clear"])
}

/// Operations available on every content-setting entry.
fn content_setting() -> Vec<ApiEntry> {
    leaves(&["clear", "get", "set", "getResourceIdentifiers"])
}

/// Operations available on every storage area.
fn storage_area() -> Vec<ApiEntry> {
    leaves(&["get", "getBytesInUse", "set", "remove", "clear"])
}

fn nth(values: &[Value], index: usize) -> Value {
    values.get(index).cloned().unwrap_or(Value::Null)
}

/// Every top-level namespace paired with its API map.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn api_catalog() -> Vec<(&'static str, Vec<ApiEntry>)> {
    vec![
        (
            "accessibilityFeatures",
            vec![
                node("spokenFeedback", setting()),
                node("largeCursor", setting()),
                node("stickyKeys", setting()),
                node("highContrast", setting()),
                node("screenMagnifier", setting()),
                node("autoclick", setting()),
                node("virtualKeyboard", setting()),
                node("animationPolicy", setting()),
            ],
        ),
        ("alarms", leaves(&["get", "getAll", "clear", "clearAll"])),
        (
            "bookmarks",
            leaves(&[
                "get",
                "getChildren",
                "getRecent",
                "getTree",
                "getSubTree",
                "search",
                "create",
                "move",
                "update",
                "remove",
                "removeTree",
            ]),
        ),
        ("browser", leaves(&["openTab"])),
        (
            "browserAction",
            leaves(&[
                "getTitle",
                "setIcon",
                "getPopup",
                "getBadgeText",
                "getBadgeBackgroundColor",
            ]),
        ),
        (
            "browsingData",
            leaves(&[
                "settings",
                "remove",
                "removeAppcache",
                "removeCache",
                "removeCookies",
                "removeDownloads",
                "removeFileSystems",
                "removeFormData",
                "removeHistory",
                "removeIndexedDB",
                "removeLocalStorage",
                "removePluginData",
                "removePasswords",
                "removeWebSQL",
            ]),
        ),
        ("commands", leaves(&["getAll"])),
        (
            "contentSettings",
            vec![
                node("cookies", content_setting()),
                node("images", content_setting()),
                node("javascript", content_setting()),
                node("location", content_setting()),
                node("plugins", content_setting()),
                node("popups", content_setting()),
                node("notifications", content_setting()),
                node("fullscreen", content_setting()),
                node("mouselock", content_setting()),
                node("microphone", content_setting()),
                node("camera", content_setting()),
                node("unsandboxedPlugins", content_setting()),
                node("automaticDownloads", content_setting()),
            ],
        ),
        ("contextMenus", leaves(&["update", "remove", "removeAll"])),
        (
            "cookies",
            leaves(&["get", "getAll", "set", "remove", "getAllCookieStores"]),
        ),
        (
            "debugger",
            leaves(&["attach", "detach", "sendCommand", "getTargets"]),
        ),
        ("desktopCapture", leaves(&["chooseDesktopMedia"])),
        ("documentScan", leaves(&["scan"])),
        (
            "downloads",
            leaves(&[
                "download",
                "search",
                "pause",
                "resume",
                "cancel",
                "getFileIcon",
                "erase",
                "removeFile",
                "acceptDanger",
            ]),
        ),
        (
            "enterprise",
            vec![node(
                "platformKeys",
                leaves(&[
                    "getToken",
                    "getCertificates",
                    "importCertificate",
                    "removeCertificate",
                ]),
            )],
        ),
        (
            "extension",
            leaves(&["isAllowedIncognitoAccess", "isAllowedFileSchemeAccess"]),
        ),
        ("fileBrowserHandler", leaves(&["selectFile"])),
        (
            "fileSystemProvider",
            leaves(&["mount", "unmount", "getAll", "get", "notify"]),
        ),
        (
            "fontSettings",
            leaves(&[
                "setDefaultFontSize",
                "getFont",
                "getDefaultFontSize",
                "getMinimumFontSize",
                "setMinimumFontSize",
                "getDefaultFixedFontSize",
                "clearDefaultFontSize",
                "setDefaultFixedFontSize",
                "clearFont",
                "setFont",
                "clearMinimumFontSize",
                "getFontList",
                "clearDefaultFixedFontSize",
            ]),
        ),
        ("gcm", leaves(&["register", "unregister", "send"])),
        (
            "history",
            leaves(&[
                "search",
                "getVisits",
                "addUrl",
                "deleteUrl",
                "deleteRange",
                "deleteAll",
            ]),
        ),
        ("i18n", leaves(&["getAcceptLanguages", "detectLanguage"])),
        (
            "identity",
            leaves(&[
                "getAuthToken",
                "getProfileUserInfo",
                "removeCachedAuthToken",
                "launchWebAuthFlow",
            ]),
        ),
        ("idle", leaves(&["queryState"])),
        (
            "input",
            vec![node(
                "ime",
                leaves(&[
                    "setMenuItems",
                    "commitText",
                    "setCandidates",
                    "setComposition",
                    "updateMenuItems",
                    "setCandidateWindowProperties",
                    "clearComposition",
                    "setCursorPosition",
                    "sendKeyEvents",
                    "deleteSurroundingText",
                ]),
            )],
        ),
        (
            "management",
            leaves(&[
                "setEnabled",
                "getPermissionWarningsById",
                "get",
                "getAll",
                "getPermissionWarningsByManifest",
                "launchApp",
                "uninstall",
                "getSelf",
                "uninstallSelf",
                "createAppShortcut",
                "setLaunchType",
                "generateAppForLink",
            ]),
        ),
        (
            "networking",
            vec![node(
                "config",
                leaves(&["setNetworkFilter", "finishAuthentication"]),
            )],
        ),
        (
            "notifications",
            leaves(&["create", "update", "clear", "getAll", "getPermissionLevel"]),
        ),
        ("pageAction", leaves(&["getTitle", "setIcon", "getPopup"])),
        ("pageCapture", leaves(&["saveAsMHTML"])),
        (
            "permissions",
            leaves(&["getAll", "contains", "request", "remove"]),
        ),
        (
            "platformKeys",
            vec![
                leaf("selectClientCertificates"),
                leaf("verifyTLSServerCertificate"),
                leaf_with("getKeyPair", |values| {
                    json!({
                        "publicKey": nth(values, 0),
                        "privateKey": nth(values, 1),
                    })
                }),
            ],
        ),
        (
            "runtime",
            vec![
                leaf("getBackgroundPage"),
                leaf("openOptionsPage"),
                leaf("setUninstallURL"),
                leaf("restartAfterDelay"),
                leaf("sendMessage"),
                leaf("sendNativeMessage"),
                leaf("getPlatformInfo"),
                leaf("getPackageDirectoryEntry"),
                leaf_with("requestUpdateCheck", |values| {
                    json!({
                        "status": nth(values, 0),
                        "details": nth(values, 1),
                    })
                }),
            ],
        ),
        ("scriptBadge", leaves(&["getPopup"])),
        (
            "sessions",
            leaves(&["getRecentlyClosed", "getDevices", "restore"]),
        ),
        (
            "storage",
            vec![
                node("sync", storage_area()),
                node("local", storage_area()),
                node("managed", storage_area()),
            ],
        ),
        (
            "socket",
            leaves(&[
                "create",
                "connect",
                "bind",
                "read",
                "write",
                "recvFrom",
                "sendTo",
                "listen",
                "accept",
                "setKeepAlive",
                "setNoDelay",
                "getInfo",
                "getNetworkList",
            ]),
        ),
        (
            "sockets",
            vec![
                node(
                    "tcp",
                    leaves(&[
                        "create",
                        "update",
                        "setPaused",
                        "setKeepAlive",
                        "setNoDelay",
                        "connect",
                        "disconnect",
                        "secure",
                        "send",
                        "close",
                        "getInfo",
                        "getSockets",
                    ]),
                ),
                node(
                    "tcpServer",
                    leaves(&[
                        "create",
                        "update",
                        "setPaused",
                        "listen",
                        "disconnect",
                        "close",
                        "getInfo",
                        "getSockets",
                    ]),
                ),
                node(
                    "udp",
                    leaves(&[
                        "create",
                        "update",
                        "setPaused",
                        "bind",
                        "send",
                        "close",
                        "getInfo",
                        "getSockets",
                        "joinGroup",
                        "leaveGroup",
                        "setMulticastTimeToLive",
                        "setMulticastLoopbackMode",
                        "getJoinedGroups",
                        "setBroadcast",
                    ]),
                ),
            ],
        ),
        (
            "system",
            vec![
                node("cpu", leaves(&["getInfo"])),
                node("memory", leaves(&["getInfo"])),
                node(
                    "storage",
                    leaves(&["getInfo", "ejectDevice", "getAvailableCapacity"]),
                ),
            ],
        ),
        ("tabCapture", leaves(&["capture", "getCapturedTabs"])),
        (
            "tabs",
            leaves(&[
                "get",
                "getCurrent",
                "sendMessage",
                "create",
                "duplicate",
                "query",
                "highlight",
                "update",
                "move",
                "reload",
                "remove",
                "detectLanguage",
                "captureVisibleTab",
                "executeScript",
                "insertCSS",
                "setZoom",
                "getZoom",
                "setZoomSettings",
                "getZoomSettings",
                "discard",
            ]),
        ),
        ("topSites", leaves(&["get"])),
        ("tts", leaves(&["isSpeaking", "getVoices", "speak"])),
        ("types", leaves(&["set", "get", "clear"])),
        (
            "vpnProvider",
            leaves(&[
                "createConfig",
                "destroyConfig",
                "setParameters",
                "sendPacket",
                "notifyConnectionStateChanged",
            ]),
        ),
        ("wallpaper", leaves(&["setWallpaper"])),
        ("webNavigation", leaves(&["getFrame", "getAllFrames"])),
        ("webRequest", leaves(&["handlerBehaviorChanged"])),
        (
            "windows",
            leaves(&[
                "get",
                "getCurrent",
                "getLastFocused",
                "getAll",
                "create",
                "update",
                "remove",
            ]),
        ),
    ]
}
