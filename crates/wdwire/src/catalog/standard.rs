//! The standard W3C WebDriver command table.
//!
//! `$[session]` and `$[element]` are filled from the command's session and
//! element ids. Other placeholders (`$[name]`, `$[shadow]`,
//! `$[propertyName]`) are route parameters the caller supplies.

use super::HttpMethod::{self, Delete, Get, Post};

pub(super) const STANDARD_COMMANDS: &[(&str, HttpMethod, &str)] = &[
    // Session
    ("Status", Get, "/status"),
    ("NewSession", Post, "/session"),
    ("DeleteSession", Delete, "/session/$[session]"),
    ("GetTimeouts", Get, "/session/$[session]/timeouts"),
    ("SetTimeouts", Post, "/session/$[session]/timeouts"),
    // Navigation
    ("NavigateTo", Post, "/session/$[session]/url"),
    ("GetCurrentUrl", Get, "/session/$[session]/url"),
    ("Back", Post, "/session/$[session]/back"),
    ("Forward", Post, "/session/$[session]/forward"),
    ("Refresh", Post, "/session/$[session]/refresh"),
    ("GetTitle", Get, "/session/$[session]/title"),
    // Windows and frames
    ("GetWindowHandle", Get, "/session/$[session]/window"),
    ("CloseWindow", Delete, "/session/$[session]/window"),
    ("SwitchToWindow", Post, "/session/$[session]/window"),
    ("GetWindowHandles", Get, "/session/$[session]/window/handles"),
    ("NewWindow", Post, "/session/$[session]/window/new"),
    ("SwitchToFrame", Post, "/session/$[session]/frame"),
    ("SwitchToParentFrame", Post, "/session/$[session]/frame/parent"),
    ("GetWindowRect", Get, "/session/$[session]/window/rect"),
    ("SetWindowRect", Post, "/session/$[session]/window/rect"),
    ("MaximizeWindow", Post, "/session/$[session]/window/maximize"),
    ("MinimizeWindow", Post, "/session/$[session]/window/minimize"),
    ("FullscreenWindow", Post, "/session/$[session]/window/fullscreen"),
    // Element lookup
    ("GetActiveElement", Get, "/session/$[session]/element/active"),
    ("GetElementShadowRoot", Get, "/session/$[session]/element/$[element]/shadow"),
    ("FindElement", Post, "/session/$[session]/element"),
    ("FindElements", Post, "/session/$[session]/elements"),
    ("FindElementFromElement", Post, "/session/$[session]/element/$[element]/element"),
    ("FindElementsFromElement", Post, "/session/$[session]/element/$[element]/elements"),
    ("FindElementFromShadowRoot", Post, "/session/$[session]/shadow/$[shadow]/element"),
    ("FindElementsFromShadowRoot", Post, "/session/$[session]/shadow/$[shadow]/elements"),
    // Element state
    ("IsElementSelected", Get, "/session/$[session]/element/$[element]/selected"),
    ("GetElementAttribute", Get, "/session/$[session]/element/$[element]/attribute/$[name]"),
    ("GetElementProperty", Get, "/session/$[session]/element/$[element]/property/$[name]"),
    ("GetElementCssValue", Get, "/session/$[session]/element/$[element]/css/$[propertyName]"),
    ("GetElementText", Get, "/session/$[session]/element/$[element]/text"),
    ("GetElementTagName", Get, "/session/$[session]/element/$[element]/name"),
    ("GetElementRect", Get, "/session/$[session]/element/$[element]/rect"),
    ("IsElementEnabled", Get, "/session/$[session]/element/$[element]/enabled"),
    ("GetComputedRole", Get, "/session/$[session]/element/$[element]/computedrole"),
    ("GetComputedLabel", Get, "/session/$[session]/element/$[element]/computedlabel"),
    // Element interaction
    ("ElementClick", Post, "/session/$[session]/element/$[element]/click"),
    ("ElementClear", Post, "/session/$[session]/element/$[element]/clear"),
    ("ElementSendKeys", Post, "/session/$[session]/element/$[element]/value"),
    // Document
    ("GetPageSource", Get, "/session/$[session]/source"),
    ("ExecuteScript", Post, "/session/$[session]/execute/sync"),
    ("ExecuteAsyncScript", Post, "/session/$[session]/execute/async"),
    // Cookies
    ("GetAllCookies", Get, "/session/$[session]/cookie"),
    ("GetNamedCookie", Get, "/session/$[session]/cookie/$[name]"),
    ("AddCookie", Post, "/session/$[session]/cookie"),
    ("DeleteCookie", Delete, "/session/$[session]/cookie/$[name]"),
    ("DeleteAllCookies", Delete, "/session/$[session]/cookie"),
    // Actions
    ("PerformActions", Post, "/session/$[session]/actions"),
    ("ReleaseActions", Delete, "/session/$[session]/actions"),
    // User prompts
    ("DismissAlert", Post, "/session/$[session]/alert/dismiss"),
    ("AcceptAlert", Post, "/session/$[session]/alert/accept"),
    ("GetAlertText", Get, "/session/$[session]/alert/text"),
    ("SendAlertText", Post, "/session/$[session]/alert/text"),
    // Screen capture and printing
    ("TakeScreenshot", Get, "/session/$[session]/screenshot"),
    ("TakeElementScreenshot", Get, "/session/$[session]/element/$[element]/screenshot"),
    ("PrintPage", Post, "/session/$[session]/print"),
];
